//! Elevation smoothing seam
//!
//! Elevation gain is very sensitive to sensor noise. Callers may plug in any
//! smoother (DEM correction, Kalman, ...) through [`ElevationSmoother`]; the
//! crate ships a simple centered moving average.

use std::fmt::Debug;

/// Transforms an elevation series into a smoothed series of the same length
pub trait ElevationSmoother: Debug + Send + Sync {
    fn smooth(&self, elevation: &[f64]) -> Vec<f64>;
}

/// Centered moving average over `2 * half_window + 1` samples, shrinking at the edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingAverageSmoother {
    pub half_window: usize,
}

impl MovingAverageSmoother {
    pub fn new(half_window: usize) -> Self {
        Self { half_window }
    }
}

impl Default for MovingAverageSmoother {
    fn default() -> Self {
        Self { half_window: 2 }
    }
}

impl ElevationSmoother for MovingAverageSmoother {
    fn smooth(&self, elevation: &[f64]) -> Vec<f64> {
        if self.half_window == 0 || elevation.len() < 2 {
            return elevation.to_vec();
        }

        let mut prefix = Vec::with_capacity(elevation.len() + 1);
        prefix.push(0.0);
        for e in elevation {
            let last = prefix[prefix.len() - 1];
            prefix.push(last + e);
        }

        (0..elevation.len())
            .map(|i| {
                let lo = i.saturating_sub(self.half_window);
                let hi = (i + self.half_window + 1).min(elevation.len());
                (prefix[hi] - prefix[lo]) / (hi - lo) as f64
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_window_is_identity() {
        let smoother = MovingAverageSmoother::new(0);
        let series = vec![1.0, 5.0, 2.0];
        assert_eq!(smoother.smooth(&series), series);
    }

    #[test]
    fn test_moving_average_flattens_spike() {
        let smoother = MovingAverageSmoother::new(1);
        let smoothed = smoother.smooth(&[100.0, 100.0, 130.0, 100.0, 100.0]);

        assert_eq!(smoothed.len(), 5);
        assert!((smoothed[0] - 100.0).abs() < 1e-9);
        assert!((smoothed[1] - 110.0).abs() < 1e-9);
        assert!((smoothed[2] - 110.0).abs() < 1e-9);
        assert!((smoothed[4] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_series_unchanged() {
        let smoother = MovingAverageSmoother::default();
        let smoothed = smoother.smooth(&[42.0; 10]);
        assert!(smoothed.iter().all(|e| (e - 42.0).abs() < 1e-9));
    }
}
