//! Waveform samplers that drive the bar heights
//!
//! A waveform is a stateful function that rewrites a slice of per-bar fill
//! fractions every time it is sampled. Two built-in shapes are provided:
//! - `linear`: a staggered triangle wave stepping a fixed amount per sample
//! - `sin`: a sine wave travelling across the bars with elapsed time
//!
//! Custom shapes are plain closures wrapped in a [`WaveformFactory`].

mod linear;
mod sine;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

pub use linear::{Direction, LINEAR_STEP, Linear};
pub use sine::Sine;

/// Parameters handed to a waveform when it is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformConfig {
    /// Configured number of bars (fixes the sine phase spacing)
    pub bar_count: usize,
}

impl WaveformConfig {
    pub fn new(bar_count: usize) -> Self {
        Self { bar_count }
    }
}

/// A stateful sampler producing per-bar fill fractions in `[0, 1]`.
///
/// `sample` rewrites `values` in place. Returning `ControlFlow::Break(())`
/// asks the caller to stop animating.
pub trait Waveform: Send {
    fn sample(&mut self, values: &mut [f64], elapsed: Duration) -> ControlFlow<()>;
}

impl<F> Waveform for F
where
    F: FnMut(&mut [f64], Duration) -> ControlFlow<()> + Send,
{
    fn sample(&mut self, values: &mut [f64], elapsed: Duration) -> ControlFlow<()> {
        self(values, elapsed)
    }
}

/// Creates a fresh custom waveform each time the render loop starts
pub type WaveformFactory = Arc<dyn Fn(&WaveformConfig) -> Box<dyn Waveform> + Send + Sync>;

/// Built-in waveform shapes, selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformKind {
    Linear,
    #[default]
    Sin,
}

impl WaveformKind {
    pub const ALL: [WaveformKind; 2] = [WaveformKind::Linear, WaveformKind::Sin];

    pub fn as_str(&self) -> &'static str {
        match self {
            WaveformKind::Linear => "linear",
            WaveformKind::Sin => "sin",
        }
    }

    /// Create a new sampler with its own, empty phase state
    pub fn create(&self, config: &WaveformConfig) -> Box<dyn Waveform> {
        match self {
            WaveformKind::Linear => Box::new(Linear::new()),
            WaveformKind::Sin => Box::new(Sine::new(config.bar_count)),
        }
    }
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WaveformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(WaveformKind::Linear),
            "sin" | "sine" => Ok(WaveformKind::Sin),
            other => Err(format!(
                "Unknown waveform: {} (expected one of: linear, sin)",
                other
            )),
        }
    }
}

/// Waveform selection: a registered name or a caller-supplied factory
#[derive(Clone)]
pub enum Animate {
    Named(WaveformKind),
    Custom(WaveformFactory),
}

impl Animate {
    /// Wrap a factory closure as a custom waveform
    pub fn custom<F, W>(factory: F) -> Self
    where
        F: Fn(&WaveformConfig) -> W + Send + Sync + 'static,
        W: Waveform + 'static,
    {
        Animate::Custom(Arc::new(move |config: &WaveformConfig| {
            Box::new(factory(config)) as Box<dyn Waveform>
        }))
    }

    /// Resolve to a fresh sampler
    pub fn create(&self, config: &WaveformConfig) -> Box<dyn Waveform> {
        match self {
            Animate::Named(kind) => kind.create(config),
            Animate::Custom(factory) => factory(config),
        }
    }
}

impl Default for Animate {
    fn default() -> Self {
        Animate::Named(WaveformKind::default())
    }
}

impl From<WaveformKind> for Animate {
    fn from(kind: WaveformKind) -> Self {
        Animate::Named(kind)
    }
}

impl fmt::Debug for Animate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Animate::Named(kind) => f.debug_tuple("Named").field(kind).finish(),
            Animate::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
