//! Travelling sine waveform

use super::Waveform;
use std::f64::consts::TAU;
use std::ops::ControlFlow;
use std::time::Duration;

/// Bars sample one sine period spread evenly across the configured bar count.
///
/// Bar `i` reads `(sin(t + i * 2π / bar_count) + 1) / 2` with `t` in
/// seconds. The spacing is fixed at creation, so bars added later continue
/// the same spacing past one period.
#[derive(Debug)]
pub struct Sine {
    spacing: f64,
    phases: Vec<f64>,
}

impl Sine {
    pub fn new(bar_count: usize) -> Self {
        Self {
            spacing: TAU / bar_count.max(1) as f64,
            phases: Vec::with_capacity(bar_count),
        }
    }

    fn ensure_len(&mut self, len: usize) {
        while self.phases.len() < len {
            self.phases.push(self.phases.len() as f64 * self.spacing);
        }
    }
}

impl Waveform for Sine {
    fn sample(&mut self, values: &mut [f64], elapsed: Duration) -> ControlFlow<()> {
        self.ensure_len(values.len());

        let t = elapsed.as_secs_f64();
        for (value, phase) in values.iter_mut().zip(&self.phases) {
            // sin is in [-1, 1]; shift to [0, 1]
            *value = ((t + phase).sin() + 1.0) / 2.0;
        }

        ControlFlow::Continue(())
    }
}
