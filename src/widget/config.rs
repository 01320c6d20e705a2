//! Widget configuration and profiles

use crate::waveform::{Animate, WaveformConfig, WaveformKind};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_BAR_COUNT: usize = 10;
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 200;

/// External completion signal; the widget hides itself when it resolves
pub type CloseSignal = BoxFuture<'static, ()>;

/// How the widget gets somewhere to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// The widget creates its own canvas of this size (pixels)
    Dimensions { width: u32, height: u32 },
    /// The host attaches a render target before `build()`
    Container,
}

impl Default for Profile {
    fn default() -> Self {
        Profile::Dimensions {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

pub struct WidgetConfig {
    pub bar_count: usize,
    pub animate: Animate,
    pub update_interval: Duration,
    pub profile: Profile,
    pub on_close: Option<CloseSignal>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            bar_count: DEFAULT_BAR_COUNT,
            animate: Animate::Named(WaveformKind::Sin),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            profile: Profile::default(),
            on_close: None,
        }
    }
}

impl WidgetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bar_count(mut self, bar_count: usize) -> Self {
        self.bar_count = bar_count;
        self
    }

    pub fn animate(mut self, animate: impl Into<Animate>) -> Self {
        self.animate = animate.into();
        self
    }

    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Hide the widget once `signal` resolves. Its output is ignored.
    pub fn on_close<F>(mut self, signal: F) -> Self
    where
        F: Future + Send + 'static,
    {
        self.on_close = Some(signal.map(|_| ()).boxed());
        self
    }

    /// Replace zero counts, intervals and sizes with their defaults
    pub(crate) fn apply_defaults(&mut self) {
        if self.bar_count == 0 {
            self.bar_count = DEFAULT_BAR_COUNT;
        }

        if self.update_interval.is_zero() {
            self.update_interval = DEFAULT_UPDATE_INTERVAL;
        }

        if let Profile::Dimensions { width, height } = &mut self.profile {
            if *width == 0 {
                *width = DEFAULT_WIDTH;
            }
            if *height == 0 {
                *height = DEFAULT_HEIGHT;
            }
        }
    }

    pub(crate) fn waveform_config(&self) -> WaveformConfig {
        WaveformConfig::new(self.bar_count)
    }
}

impl fmt::Debug for WidgetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetConfig")
            .field("bar_count", &self.bar_count)
            .field("animate", &self.animate)
            .field("update_interval", &self.update_interval)
            .field("profile", &self.profile)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
