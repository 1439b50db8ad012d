//! Rolling-average smoothing of gaze samples.

use std::collections::VecDeque;

/// Smoothed gaze point in display pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GazePoint {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate
    pub y: f64,
}

impl GazePoint {
    /// Create a point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounded per-axis history with an unweighted mean
///
/// The mean is taken over however many samples are present, so the first
/// outputs are not biased toward zero.
#[derive(Debug, Clone)]
pub struct GazeSmoother {
    window_size: usize,
    x_window: VecDeque<f64>,
    y_window: VecDeque<f64>,
}

impl GazeSmoother {
    /// Create a smoother averaging the last `window_size` samples
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is 0
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "Window size must be greater than 0");
        Self {
            window_size,
            x_window: VecDeque::with_capacity(window_size + 1),
            y_window: VecDeque::with_capacity(window_size + 1),
        }
    }

    /// Append a sample, evicting the oldest once the window is full
    pub fn push(&mut self, x: f64, y: f64) {
        self.x_window.push_back(x);
        self.y_window.push_back(y);

        while self.x_window.len() > self.window_size {
            self.x_window.pop_front();
        }
        while self.y_window.len() > self.window_size {
            self.y_window.pop_front();
        }
    }

    /// Mean of the current window contents, or `None` before the first push
    #[must_use]
    pub fn current_average(&self) -> Option<GazePoint> {
        if self.x_window.is_empty() || self.y_window.is_empty() {
            return None;
        }

        Some(GazePoint {
            x: Self::mean(&self.x_window),
            y: Self::mean(&self.y_window),
        })
    }

    /// Number of samples currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.x_window.len()
    }

    /// Whether no sample has been pushed since creation or the last reset
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x_window.is_empty()
    }

    /// Maximum number of samples held per axis
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.window_size
    }

    /// Horizontal history, oldest first
    pub fn x_window(&self) -> impl Iterator<Item = f64> + '_ {
        self.x_window.iter().copied()
    }

    /// Vertical history, oldest first
    pub fn y_window(&self) -> impl Iterator<Item = f64> + '_ {
        self.y_window.iter().copied()
    }

    /// Drop all history
    pub fn reset(&mut self) {
        self.x_window.clear();
        self.y_window.clear();
    }

    #[allow(clippy::cast_precision_loss)] // Window sizes are tiny
    fn mean(window: &VecDeque<f64>) -> f64 {
        window.iter().sum::<f64>() / window.len() as f64
    }
}
