//! Oscillating bar loading indicator
//!
//! A [`BarWidget`] animates a row of bars with a pluggable [`Waveform`] and
//! paints them onto any [`RenderTarget`]: a terminal, a raster canvas, or
//! plain memory.

pub mod config;
pub mod target;
pub mod waveform;
pub mod widget;

pub use target::{CanvasTarget, MemoryTarget, RenderTarget, TargetError, TerminalTarget};
pub use waveform::{Animate, Waveform, WaveformConfig, WaveformFactory, WaveformKind};
pub use widget::{BarWidget, Profile, TickOutcome, WidgetConfig, WidgetError};
