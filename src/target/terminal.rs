//! Terminal render target backed by indicatif

use super::RenderTarget;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

const BAR_TEMPLATE: &str = "{bar:40.cyan/blue}";

/// Where a visible target draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Stderr,
    Hidden,
}

impl Output {
    fn draw_target(self) -> ProgressDrawTarget {
        match self {
            Output::Stderr => ProgressDrawTarget::stderr(),
            Output::Hidden => ProgressDrawTarget::hidden(),
        }
    }
}

/// Draws each widget bar as a horizontal 100-step progress bar on stderr.
/// Nothing is drawn until the target is made visible.
pub struct TerminalTarget {
    multi: MultiProgress,
    output: Output,
    bars: Vec<ProgressBar>,
    style: ProgressStyle,
    visible: bool,
}

impl TerminalTarget {
    pub fn new() -> Self {
        Self::with_output(Output::Stderr)
    }

    /// Target that keeps bar state but never draws, even when visible
    pub fn hidden() -> Self {
        Self::with_output(Output::Hidden)
    }

    fn with_output(output: Output) -> Self {
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▇▆▅▄▃▂▁ ");

        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            output,
            bars: Vec::new(),
            style,
            visible: false,
        }
    }

    /// Position of one bar (0-100), mostly useful for inspection
    pub fn position(&self, index: usize) -> Option<u64> {
        self.bars.get(index).map(ProgressBar::position)
    }
}

impl Default for TerminalTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget for TerminalTarget {
    fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }

        if visible {
            self.multi.set_draw_target(self.output.draw_target());
        } else {
            if let Err(e) = self.multi.clear() {
                tracing::debug!("Failed to clear terminal bars: {}", e);
            }
            self.multi.set_draw_target(ProgressDrawTarget::hidden());
        }
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn attach_bars(&mut self, count: usize) {
        for bar in self.bars.drain(..) {
            self.multi.remove(&bar);
        }

        for _ in 0..count {
            let bar = self.multi.add(ProgressBar::new(100));
            bar.set_style(self.style.clone());
            self.bars.push(bar);
        }
    }

    fn bar_count(&self) -> usize {
        self.bars.len()
    }

    fn set_fill(&mut self, index: usize, percent: f64) {
        if let Some(bar) = self.bars.get(index) {
            bar.set_position(percent.round().clamp(0.0, 100.0) as u64);
        }
    }
}
