use super::PointFilter;
use std::collections::VecDeque;

/// Moving average filter
pub struct MovingAverageFilter {
    window_size: usize,
    buffer: VecDeque<(f64, f64)>,
}

impl MovingAverageFilter {
    /// Create a new moving average filter
    ///
    /// # Panics
    ///
    /// Panics if the window size is zero
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "Window size must be greater than 0");
        Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size),
        }
    }
}

impl PointFilter for MovingAverageFilter {
    #[allow(clippy::cast_precision_loss)]
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        if self.buffer.len() >= self.window_size {
            self.buffer.pop_front();
        }
        self.buffer.push_back((x, y));

        let n = self.buffer.len() as f64;
        let (sum_x, sum_y) = self
            .buffer
            .iter()
            .fold((0.0, 0.0), |(ax, ay), &(bx, by)| (ax + bx, ay + by));

        (sum_x / n, sum_y / n)
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn name(&self) -> &str {
        "MovingAverageFilter"
    }
}
