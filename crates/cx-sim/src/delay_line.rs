//! Fixed-length transport delay.

use std::collections::VecDeque;

/// FIFO holding the last `delay_steps + 1` outlet values.
///
/// Each [`advance`](Self::advance) returns the value pushed `delay_steps + 1`
/// calls earlier (or the seed while the line is still filling).
#[derive(Debug, Clone)]
pub struct DelayLine<T: Copy> {
    buf: VecDeque<T>,
}

impl<T: Copy> DelayLine<T> {
    /// Create a line of length `delay_steps + 1` filled with `seed`.
    pub fn new(delay_steps: usize, seed: T) -> Self {
        Self {
            buf: std::iter::repeat_n(seed, delay_steps + 1).collect(),
        }
    }

    /// Pop the oldest value and push `newest`.
    pub fn advance(&mut self, newest: T) -> T {
        let oldest = self.buf.pop_front().unwrap_or(newest);
        self.buf.push_back(newest);
        oldest
    }

    /// Number of steps between a push and the pop that returns it, minus one.
    pub fn delay_steps(&self) -> usize {
        self.buf.len().saturating_sub(1)
    }
}

/// Delay in whole integration steps.
pub fn delay_steps(delay_s: f64, dt_s: f64) -> usize {
    let steps = (delay_s / dt_s.max(1e-12)).round();
    if steps.is_finite() && steps > 0.0 {
        steps as usize
    } else {
        0
    }
}
