//! Linear ping-pong waveform

use super::Waveform;
use std::ops::ControlFlow;
use std::time::Duration;

/// Fraction added or removed per sample
pub const LINEAR_STEP: f64 = 0.05;

// Accumulated steps drift off the exact edges; snap within this distance.
const EDGE_TOLERANCE: f64 = 1e-9;

/// Travel direction of a single bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rising,
    Falling,
}

#[derive(Debug, Clone, Copy)]
struct BarPhase {
    value: f64,
    direction: Direction,
}

impl BarPhase {
    fn advance(&mut self, step: f64) {
        match self.direction {
            Direction::Rising => self.value += step,
            Direction::Falling => self.value -= step,
        }

        if self.value >= 1.0 - EDGE_TOLERANCE {
            self.value = 1.0;
            self.direction = Direction::Falling;
        }

        if self.value <= EDGE_TOLERANCE {
            self.value = 0.0;
            self.direction = Direction::Rising;
        }
    }
}

/// Each bar bounces between 0 and 1 by a fixed step per sample.
///
/// Speed is tied to the sampling rate, not to elapsed time. Bar `i` of `n`
/// starts at `i / n` moving upward, which staggers the bars into a
/// triangle wave.
#[derive(Debug)]
pub struct Linear {
    bars: Vec<BarPhase>,
    step: f64,
}

impl Linear {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            step: LINEAR_STEP,
        }
    }

    /// Current value and direction of a bar, if it has been sampled yet
    pub fn phase(&self, index: usize) -> Option<(f64, Direction)> {
        self.bars.get(index).map(|bar| (bar.value, bar.direction))
    }

    fn ensure_len(&mut self, len: usize) {
        while self.bars.len() < len {
            let value = self.bars.len() as f64 / len as f64;
            self.bars.push(BarPhase {
                value,
                direction: Direction::Rising,
            });
        }
    }
}

impl Default for Linear {
    fn default() -> Self {
        Self::new()
    }
}

impl Waveform for Linear {
    fn sample(&mut self, values: &mut [f64], _elapsed: Duration) -> ControlFlow<()> {
        self.ensure_len(values.len());

        for (value, bar) in values.iter_mut().zip(self.bars.iter_mut()) {
            bar.advance(self.step);
            *value = bar.value;
        }

        ControlFlow::Continue(())
    }
}
