//! Moving-average smoothing of measured inputs.
//!
//! Wind directions are averaged on the unit circle so that samples either side of +-pi do not
//! cancel into a head wind.

use std::collections::VecDeque;

use crate::error::{ControlError, ControlResult};

/// Fixed-window moving average.
///
/// Until the window fills, the average is over the samples seen so far.
#[derive(Clone, Debug, PartialEq)]
pub struct MovingAverage {
    window: usize,
    samples: VecDeque<f64>,
}

impl MovingAverage {
    /// Create a filter averaging over the last `window` samples.
    ///
    /// # Errors
    ///
    /// Returns error if `window` is zero.
    pub fn new(window: usize) -> ControlResult<Self> {
        if window == 0 {
            return Err(ControlError::InvalidArg {
                what: "moving average window must be at least 1",
            });
        }
        Ok(Self {
            window,
            samples: VecDeque::with_capacity(window),
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Push a sample and return the current average.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
        self.value().unwrap_or(value)
    }

    /// Current average, `None` before the first sample.
    pub fn value(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

/// Moving average of an angle in radians, computed from its sine and cosine.
#[derive(Clone, Debug, PartialEq)]
pub struct WindDirectionFilter {
    sin: MovingAverage,
    cos: MovingAverage,
}

impl WindDirectionFilter {
    /// # Errors
    ///
    /// Returns error if `window` is zero.
    pub fn new(window: usize) -> ControlResult<Self> {
        Ok(Self {
            sin: MovingAverage::new(window)?,
            cos: MovingAverage::new(window)?,
        })
    }

    /// Push a direction and return the averaged direction in `[-pi, pi]`.
    pub fn push(&mut self, direction: f64) -> f64 {
        let s = self.sin.push(direction.sin());
        let c = self.cos.push(direction.cos());
        s.atan2(c)
    }

    pub fn reset(&mut self) {
        self.sin.reset();
        self.cos.reset();
    }
}
