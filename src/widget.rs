//! Animated bar widget and its render loop
//!
//! A [`BarWidget`] owns a row of fill fractions, a render target, and an
//! optional render-loop task. Each tick samples the waveform, checks the
//! fractions and pushes them to the target as percentages.
//!
//! Lifecycle:
//! ```text
//! Unbuilt ──build()──> Shown+Running
//! Shown+Running ──stop()──> Shown+Stopped
//! Shown+Stopped ──start()/show()──> Shown+Running
//! Shown+Running/Stopped ──hide()──> Hidden
//! Hidden ──show()──> Shown+Running
//! ```

mod config;

use crate::target::{CanvasTarget, RenderTarget, TargetError};
use crate::waveform::Waveform;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub use config::{
    CloseSignal, DEFAULT_BAR_COUNT, DEFAULT_HEIGHT, DEFAULT_UPDATE_INTERVAL, DEFAULT_WIDTH, Profile,
    WidgetConfig,
};

/// Widget error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WidgetError {
    /// No render target could be attached or created at build time
    #[error("No render target could be established: {0}")]
    NoRenderTarget(String),
    /// `build()` was called outside a tokio runtime
    #[error("No tokio runtime available to drive the render loop")]
    NoRuntime,
    #[error("Widget has already been built")]
    AlreadyBuilt,
    /// A waveform produced a fraction outside `[0, 1]`
    #[error("Invalid scale value {value} for bar {index}. Value must be between 0 and 1")]
    OutOfRange { index: usize, value: f64 },
}

impl WidgetError {
    /// Whether this error aborts construction (as opposed to a failed tick)
    pub fn is_configuration_fatal(&self) -> bool {
        !matches!(self, WidgetError::OutOfRange { .. })
    }
}

impl From<TargetError> for WidgetError {
    fn from(e: TargetError) -> Self {
        WidgetError::NoRenderTarget(e.to_string())
    }
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Fractions were sampled and pushed to the render target
    Rendered,
    /// The waveform asked to stop; the render loop has been stopped
    Finished,
    /// Nothing to sample: the render loop has never been started
    Idle,
}

struct RenderLoop {
    id: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct WidgetInner {
    this: Weak<Mutex<WidgetInner>>,
    config: WidgetConfig,
    built: bool,
    runtime: Option<Handle>,
    target: Option<Box<dyn RenderTarget>>,
    canvas: Option<CanvasTarget>,
    values: Vec<f64>,
    waveform: Option<Box<dyn Waveform>>,
    origin: Instant,
    render_loop: Option<RenderLoop>,
    next_loop_id: u64,
    ticks: u64,
    last_error: Option<WidgetError>,
}

/// Indeterminate progress indicator made of oscillating bars.
///
/// `BarWidget` is a cheap handle; clones control the same widget. All
/// lifecycle operations are idempotent and never block.
#[derive(Clone)]
pub struct BarWidget {
    inner: Arc<Mutex<WidgetInner>>,
}

impl BarWidget {
    pub fn new(config: WidgetConfig) -> Self {
        let inner = Arc::new_cyclic(|this| {
            Mutex::new(WidgetInner {
                this: this.clone(),
                config,
                built: false,
                runtime: None,
                target: None,
                canvas: None,
                values: Vec::new(),
                waveform: None,
                origin: Instant::now(),
                render_loop: None,
                next_loop_id: 0,
                ticks: 0,
                last_error: None,
            })
        });

        Self { inner }
    }

    /// Attach a host-owned render target. Used by the container profile;
    /// it also takes precedence over a dimensions canvas.
    pub fn attach<T>(&self, target: T) -> &Self
    where
        T: RenderTarget + 'static,
    {
        let mut inner = self.lock();
        if inner.built {
            tracing::warn!("Ignoring render target attached after build");
        } else {
            inner.target = Some(Box::new(target));
        }
        drop(inner);
        self
    }

    /// Establish the render target and bars, then show and start animating
    pub fn build(&self) -> Result<(), WidgetError> {
        let close_signal = {
            let mut inner = self.lock();
            inner.build()?
        };

        if let Some(signal) = close_signal {
            self.register_close(signal)?;
        }

        self.show();
        Ok(())
    }

    /// Make the bars visible and start the render loop
    pub fn show(&self) {
        self.lock().show();
    }

    /// Start the render loop if it is not already running
    pub fn start(&self) {
        self.lock().start();
    }

    /// Cancel the render loop. Bars keep their last fill.
    pub fn stop(&self) {
        self.lock().stop();
    }

    /// Stop the render loop and hide the bars
    pub fn hide(&self) {
        self.lock().hide();
    }

    /// Run one tick in the caller's context
    pub fn tick(&self) -> Result<TickOutcome, WidgetError> {
        self.lock().tick()
    }

    /// Stop the render loop and paint the frame a fresh waveform shows
    /// `elapsed` into its animation
    pub fn render_at(&self, elapsed: Duration) -> Result<TickOutcome, WidgetError> {
        self.lock().render_at(elapsed)
    }

    pub fn is_visible(&self) -> bool {
        self.lock()
            .target
            .as_ref()
            .is_some_and(|target| target.is_visible())
    }

    /// Whether the render loop is active
    pub fn is_enabled(&self) -> bool {
        self.lock().render_loop.is_some()
    }

    /// Current fraction per bar
    pub fn fractions(&self) -> Vec<f64> {
        self.lock().values.clone()
    }

    /// Number of ticks that reached the render target
    pub fn tick_count(&self) -> u64 {
        self.lock().ticks
    }

    /// Last error raised inside the background render loop
    pub fn last_error(&self) -> Option<WidgetError> {
        self.lock().last_error.clone()
    }

    /// Canvas created by the dimensions profile, if any
    pub fn canvas(&self) -> Option<CanvasTarget> {
        self.lock().canvas.clone()
    }

    fn lock(&self) -> MutexGuard<'_, WidgetInner> {
        // Widget state stays consistent across a panicking tick
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn register_close(&self, signal: CloseSignal) -> Result<(), WidgetError> {
        let runtime = self.lock().runtime.clone().ok_or(WidgetError::NoRuntime)?;
        let widget = Arc::downgrade(&self.inner);

        runtime.spawn(async move {
            signal.await;

            let Some(inner) = widget.upgrade() else {
                return;
            };
            let mut inner = inner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            tracing::debug!("Close signal resolved, hiding widget");
            inner.hide();
        });

        Ok(())
    }
}

impl WidgetInner {
    fn build(&mut self) -> Result<Option<CloseSignal>, WidgetError> {
        if self.built {
            return Err(WidgetError::AlreadyBuilt);
        }

        let runtime = Handle::try_current().map_err(|_| WidgetError::NoRuntime)?;
        self.config.apply_defaults();

        if self.target.is_none() {
            match self.config.profile {
                Profile::Dimensions { width, height } => {
                    let canvas = CanvasTarget::new(width, height)?;
                    self.canvas = Some(canvas.clone());
                    self.target = Some(Box::new(canvas));
                }
                Profile::Container => {
                    return Err(WidgetError::NoRenderTarget(
                        "container profile requires an attached render target".to_string(),
                    ));
                }
            }
        }

        // Bars rest full until the first tick
        let bar_count = self.config.bar_count;
        self.values = vec![1.0; bar_count];
        if let Some(target) = self.target.as_mut() {
            target.attach_bars(bar_count);
            for index in 0..bar_count {
                target.set_fill(index, 100.0);
            }
        }
        self.runtime = Some(runtime);
        self.built = true;

        tracing::debug!(
            "Built widget: {} bars, {:?} interval, {:?}",
            bar_count,
            self.config.update_interval,
            self.config.animate
        );

        Ok(self.config.on_close.take())
    }

    fn show(&mut self) {
        if !self.built {
            return;
        }
        let Some(target) = self.target.as_mut() else {
            return;
        };
        target.set_visible(true);
        self.start();
    }

    fn start(&mut self) {
        if self.render_loop.is_some() {
            return;
        }

        let Some(runtime) = self.runtime.clone() else {
            tracing::debug!("Ignoring start before build");
            return;
        };

        self.waveform = Some(self.config.animate.create(&self.config.waveform_config()));
        self.origin = Instant::now();
        self.next_loop_id += 1;

        let id = self.next_loop_id;
        let cancel = CancellationToken::new();
        let task = runtime.spawn(render_loop(
            self.this.clone(),
            id,
            self.config.update_interval,
            cancel.clone(),
        ));

        self.render_loop = Some(RenderLoop { id, cancel, task });
        tracing::debug!("Render loop {} started", id);
    }

    fn stop(&mut self) {
        let Some(render_loop) = self.render_loop.take() else {
            return;
        };

        render_loop.cancel.cancel();
        render_loop.task.abort();
        tracing::debug!("Render loop {} stopped", render_loop.id);
    }

    fn hide(&mut self) {
        self.stop();

        if let Some(target) = self.target.as_mut() {
            target.set_visible(false);
        }
    }

    fn is_current_loop(&self, id: u64) -> bool {
        self.render_loop.as_ref().is_some_and(|r| r.id == id)
    }

    fn tick(&mut self) -> Result<TickOutcome, WidgetError> {
        let Some(waveform) = self.waveform.as_mut() else {
            return Ok(TickOutcome::Idle);
        };

        let elapsed = Instant::now().saturating_duration_since(self.origin);
        if waveform.sample(&mut self.values, elapsed).is_break() {
            self.stop();
            return Ok(TickOutcome::Finished);
        }

        self.push_values()
    }

    /// Replays the scheduled frames before `elapsed`, then samples at `elapsed`
    fn render_at(&mut self, elapsed: Duration) -> Result<TickOutcome, WidgetError> {
        if !self.built {
            return Ok(TickOutcome::Idle);
        }
        self.stop();

        let mut waveform = self.config.animate.create(&self.config.waveform_config());
        let period = self.config.update_interval;
        let frames = u32::try_from(elapsed.as_nanos() / period.as_nanos()).unwrap_or(u32::MAX);

        for frame in 0..frames {
            if waveform.sample(&mut self.values, period * frame).is_break() {
                return Ok(TickOutcome::Finished);
            }
        }
        if waveform.sample(&mut self.values, elapsed).is_break() {
            return Ok(TickOutcome::Finished);
        }

        self.push_values()
    }

    fn push_values(&mut self) -> Result<TickOutcome, WidgetError> {
        let Some(target) = self.target.as_mut() else {
            return Ok(TickOutcome::Idle);
        };

        // Bars added or removed outside the widget are tolerated, not repaired
        let count = target.bar_count();
        for (index, &value) in self.values.iter().enumerate().take(count) {
            if !(0.0..=1.0).contains(&value) {
                return Err(WidgetError::OutOfRange { index, value });
            }
            target.set_fill(index, value * 100.0);
        }

        self.ticks += 1;
        Ok(TickOutcome::Rendered)
    }
}

async fn render_loop(
    widget: Weak<Mutex<WidgetInner>>,
    id: u64,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let Some(inner) = widget.upgrade() else {
            break;
        };
        let mut inner = inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // stop() may have won the lock between the timer firing and now
        if !inner.is_current_loop(id) {
            break;
        }

        match inner.tick() {
            Ok(TickOutcome::Rendered) | Ok(TickOutcome::Idle) => {}
            Ok(TickOutcome::Finished) => {
                tracing::debug!("Waveform finished, render loop {} ended", id);
                break;
            }
            Err(e) => {
                // The loop stays scheduled; the next tick tries again
                tracing::error!("Render loop {} tick failed: {}", id, e);
                inner.last_error = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::MemoryTarget;
    use crate::waveform::{Animate, WaveformConfig, WaveformKind};
    use std::ops::ControlFlow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn container(bar_count: usize) -> (BarWidget, MemoryTarget) {
        let target = MemoryTarget::new();
        let widget = BarWidget::new(
            WidgetConfig::new()
                .bar_count(bar_count)
                .profile(Profile::Container),
        );
        widget.attach(target.clone());
        (widget, target)
    }

    /// Constant-value waveform counting how often it is sampled
    fn constant(value: f64, calls: Arc<AtomicUsize>) -> Animate {
        Animate::custom(move |_config: &WaveformConfig| {
            let calls = Arc::clone(&calls);
            move |values: &mut [f64], _elapsed: Duration| {
                calls.fetch_add(1, Ordering::SeqCst);
                values.fill(value);
                ControlFlow::Continue(())
            }
        })
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_build_shows_and_starts() {
        let (widget, target) = container(5);
        widget.build().unwrap();

        assert!(widget.is_visible());
        assert!(widget.is_enabled());
        assert_eq!(target.bar_count(), 5);
        assert_eq!(widget.fractions(), vec![1.0; 5]);

        widget.hide();
        assert!(!widget.is_visible());
        assert!(!widget.is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dimensions_profile_creates_canvas() {
        let widget = BarWidget::new(WidgetConfig::new().bar_count(5));
        widget.build().unwrap();

        let canvas = widget.canvas().unwrap();
        assert_eq!(canvas.size(), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
        assert_eq!(canvas.bar_count(), 5);
        assert!(widget.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_container_without_target_is_fatal() {
        let widget = BarWidget::new(WidgetConfig::new().profile(Profile::Container));
        let err = widget.build().unwrap_err();

        assert!(matches!(err, WidgetError::NoRenderTarget(_)));
        assert!(err.is_configuration_fatal());
        assert!(!widget.is_visible());
        assert!(!widget.is_enabled());
    }

    #[test]
    fn test_build_outside_runtime_is_fatal() {
        let (widget, _target) = container(3);
        assert_eq!(widget.build(), Err(WidgetError::NoRuntime));
        assert!(!widget.is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_build_twice_is_rejected() {
        let (widget, _target) = container(3);
        widget.build().unwrap();
        assert_eq!(widget.build(), Err(WidgetError::AlreadyBuilt));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_bar_count_uses_default() {
        let (widget, target) = container(0);
        widget.build().unwrap();

        assert_eq!(target.bar_count(), DEFAULT_BAR_COUNT);
        assert_eq!(widget.fractions().len(), DEFAULT_BAR_COUNT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_push_percentages() {
        let (widget, target) = container(4);
        widget.build().unwrap();
        assert_eq!(target.fills(), vec![100.0; 4]);

        advance(150).await;

        // Sine at t = 0.1s, phases spaced by a quarter period
        let fills = target.fills();
        assert_eq!(fills.len(), 4);
        let expected = ((0.1f64).sin() + 1.0) / 2.0 * 100.0;
        assert!((fills[0] - expected).abs() < 1e-6, "bar 0 = {}", fills[0]);
        assert_eq!(widget.tick_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fraction_length_is_stable_across_ticks() {
        let (widget, _target) = container(6);
        widget.build().unwrap();

        for _ in 0..20 {
            advance(100).await;
            let fractions = widget.fractions();
            assert_eq!(fractions.len(), 6);
            assert!(fractions.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_runs_one_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let target = MemoryTarget::new();
        let widget = BarWidget::new(
            WidgetConfig::new()
                .bar_count(3)
                .animate(constant(0.5, Arc::clone(&calls)))
                .profile(Profile::Container),
        );
        widget.attach(target.clone());

        widget.build().unwrap();
        widget.start();
        widget.show();

        advance(1050).await;
        assert_eq!(calls.load(Ordering::SeqCst), 10);
        assert_eq!(widget.tick_count(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_then_start_resumes() {
        let (widget, _target) = container(3);
        widget.build().unwrap();
        advance(250).await;
        assert_eq!(widget.tick_count(), 2);

        widget.stop();
        assert!(!widget.is_enabled());
        widget.stop();
        assert!(!widget.is_enabled());
        assert!(widget.is_visible());

        advance(500).await;
        assert_eq!(widget.tick_count(), 2);

        widget.start();
        assert!(widget.is_enabled());
        advance(250).await;
        assert_eq!(widget.tick_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_uses_fresh_waveform() {
        let target = MemoryTarget::new();
        let widget = BarWidget::new(
            WidgetConfig::new()
                .bar_count(4)
                .animate(WaveformKind::Linear)
                .profile(Profile::Container),
        );
        widget.attach(target.clone());
        widget.build().unwrap();

        advance(550).await;
        widget.stop();
        assert!((widget.fractions()[0] - 0.25).abs() < 1e-9);

        widget.start();
        advance(150).await;
        assert!((widget.fractions()[0] - 0.05).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hide_then_show_restarts() {
        let (widget, target) = container(3);
        widget.build().unwrap();

        widget.hide();
        widget.hide();
        assert!(!target.is_visible());
        assert!(!widget.is_enabled());

        widget.show();
        assert!(target.is_visible());
        assert!(widget.is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_hide() {
        let (widget, target) = container(3);
        widget.build().unwrap();
        advance(150).await;
        let writes = target.writes();

        widget.hide();
        advance(1000).await;
        assert_eq!(target.writes(), writes);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_is_raised_not_clamped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let target = MemoryTarget::new();
        let widget = BarWidget::new(
            WidgetConfig::new()
                .bar_count(2)
                .animate(constant(1.5, Arc::clone(&calls)))
                .profile(Profile::Container),
        );
        widget.attach(target.clone());
        widget.build().unwrap();

        advance(50).await;
        let err = widget.tick().unwrap_err();
        assert_eq!(
            err,
            WidgetError::OutOfRange {
                index: 0,
                value: 1.5
            }
        );
        assert!(!err.is_configuration_fatal());
        assert_eq!(target.fills(), vec![100.0, 100.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_keeps_loop_scheduled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let target = MemoryTarget::new();
        let widget = BarWidget::new(
            WidgetConfig::new()
                .bar_count(2)
                .animate(constant(-0.1, Arc::clone(&calls)))
                .profile(Profile::Container),
        );
        widget.attach(target.clone());
        widget.build().unwrap();

        advance(350).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(widget.is_enabled());
        assert!(matches!(
            widget.last_error(),
            Some(WidgetError::OutOfRange { index: 0, .. })
        ));
        assert_eq!(widget.tick_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nan_is_out_of_range() {
        let calls = Arc::new(AtomicUsize::new(0));
        let target = MemoryTarget::new();
        let widget = BarWidget::new(
            WidgetConfig::new()
                .bar_count(1)
                .animate(constant(f64::NAN, calls))
                .profile(Profile::Container),
        );
        widget.attach(target);
        widget.build().unwrap();

        assert!(matches!(
            widget.tick(),
            Err(WidgetError::OutOfRange { index: 0, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waveform_break_stops_loop() {
        let target = MemoryTarget::new();
        let widget = BarWidget::new(
            WidgetConfig::new()
                .bar_count(2)
                .animate(Animate::custom(|_config: &WaveformConfig| {
                    let mut remaining = 3;
                    move |values: &mut [f64], _elapsed: Duration| {
                        if remaining == 0 {
                            return ControlFlow::Break(());
                        }
                        remaining -= 1;
                        values.fill(0.5);
                        ControlFlow::Continue(())
                    }
                }))
                .profile(Profile::Container),
        );
        widget.attach(target.clone());
        widget.build().unwrap();

        advance(1000).await;
        assert_eq!(widget.tick_count(), 3);
        assert!(!widget.is_enabled());
        assert!(widget.is_visible());
        assert!(widget.last_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_target_bar_count_bounds_the_update() {
        let (widget, target) = container(4);
        widget.build().unwrap();
        target.resize(2);
        let writes = target.writes();

        assert_eq!(widget.tick(), Ok(TickOutcome::Rendered));
        assert_eq!(target.fills().len(), 2);
        assert_eq!(target.writes(), writes + 2);

        target.resize(6);
        assert_eq!(widget.tick(), Ok(TickOutcome::Rendered));
        assert_eq!(target.fills().len(), 6);
        assert_eq!(widget.fractions().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_before_start_is_idle() {
        let (widget, target) = container(2);
        assert_eq!(widget.tick(), Ok(TickOutcome::Idle));
        assert_eq!(target.writes(), 0);
    }

    fn sine_at(seconds: f64, bar_count: usize) -> Vec<f64> {
        let spacing = std::f64::consts::TAU / bar_count as f64;
        (0..bar_count)
            .map(|i| ((seconds + i as f64 * spacing).sin() + 1.0) / 2.0)
            .collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} != {:?}", actual, expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_at_zero_shows_first_frame() {
        let (widget, target) = container(4);
        widget.build().unwrap();

        assert_eq!(widget.render_at(Duration::ZERO), Ok(TickOutcome::Rendered));
        assert_close(&widget.fractions(), &[0.5, 1.0, 0.5, 0.0]);
        assert_close(&target.fills(), &[50.0, 100.0, 50.0, 0.0]);
        assert!(!widget.is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_at_between_ticks() {
        let (widget, target) = container(4);
        widget.build().unwrap();

        widget.render_at(Duration::from_millis(250)).unwrap();
        assert_close(&widget.fractions(), &sine_at(0.25, 4));

        // The loop is stopped, so the frame stays put
        let fills = target.fills();
        advance(500).await;
        assert_eq!(target.fills(), fills);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_at_replays_stepped_waveform() {
        let target = MemoryTarget::new();
        let widget = BarWidget::new(
            WidgetConfig::new()
                .bar_count(4)
                .animate(WaveformKind::Linear)
                .profile(Profile::Container),
        );
        widget.attach(target.clone());
        widget.build().unwrap();

        // Frames at 0, 100 and 250ms
        widget.render_at(Duration::from_millis(250)).unwrap();
        assert!((widget.fractions()[0] - 0.15).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_at_saves_canvas_frame() {
        let widget = BarWidget::new(WidgetConfig::new().bar_count(4));
        widget.build().unwrap();
        widget.render_at(Duration::ZERO).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        widget.canvas().unwrap().save_png(&path).unwrap();
        assert!(path.exists());
        assert_close(&widget.fractions(), &[0.5, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_render_at_before_build_is_idle() {
        let (widget, target) = container(3);
        assert_eq!(widget.render_at(Duration::ZERO), Ok(TickOutcome::Idle));
        assert_eq!(target.writes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_before_build_is_ignored() {
        let (widget, _target) = container(2);
        widget.start();
        widget.show();
        assert!(!widget.is_enabled());
        assert!(!widget.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_signal_hides_widget() {
        let (widget, target) = {
            let target = MemoryTarget::new();
            let widget = BarWidget::new(
                WidgetConfig::new()
                    .bar_count(5)
                    .profile(Profile::Container)
                    .on_close(tokio::time::sleep(Duration::from_millis(50))),
            );
            widget.attach(target.clone());
            (widget, target)
        };
        widget.build().unwrap();
        assert!(widget.is_visible());

        advance(40).await;
        assert!(widget.is_visible());

        advance(20).await;
        assert!(!widget.is_visible());
        assert!(!widget.is_enabled());
        assert!(!target.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_signal_from_channel() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let target = MemoryTarget::new();
        let widget = BarWidget::new(
            WidgetConfig::new()
                .bar_count(2)
                .profile(Profile::Container)
                .on_close(rx),
        );
        widget.attach(target);
        widget.build().unwrap();

        tx.send(()).unwrap();
        tokio::task::yield_now().await;
        advance(1).await;
        assert!(!widget.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_signal_does_not_keep_widget_alive() {
        let (widget, _target) = {
            let target = MemoryTarget::new();
            let widget = BarWidget::new(
                WidgetConfig::new()
                    .profile(Profile::Container)
                    .on_close(tokio::time::sleep(Duration::from_millis(50))),
            );
            widget.attach(target.clone());
            (widget, target)
        };
        widget.build().unwrap();
        let weak = Arc::downgrade(&widget.inner);
        drop(widget);

        advance(100).await;
        assert!(weak.upgrade().is_none());
    }
}
