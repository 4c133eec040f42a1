//! Positional smoothing filters for overlay poses.
//!
//! The pose mapper itself is pure; these filters run afterwards on the
//! world-space X/Y of visible poses to damp landmark jitter.

/// Moving average filter for simple smoothing
pub mod moving_average;

/// Exponential filter for responsive smoothing
pub mod exponential;

use crate::Result;

/// Trait for all positional filters
pub trait PointFilter: Send + Sync {
    /// Apply filter to input values
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64);

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl PointFilter for NoFilter {
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        (x, y)
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Create a filter from a description such as `none`, `exponential:0.3` or `moving_average:5`
pub fn create_filter(spec: &str) -> Result<Box<dyn PointFilter>> {
    let spec = spec.to_lowercase();
    let (kind, param) = match spec.split_once(':') {
        Some((kind, param)) => (kind, Some(param)),
        None => (spec.as_str(), None),
    };

    match kind {
        "none" | "nofilter" => Ok(Box::new(NoFilter)),
        "exponential" => {
            let alpha = parse_param(param, 0.5_f64)?;
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(crate::Error::FilterError(format!("Alpha must be in (0, 1], got {alpha}")));
            }
            Ok(Box::new(exponential::ExponentialFilter::new(alpha)))
        }
        "moving_average" | "movingaverage" => {
            let window = parse_param(param, 3_usize)?;
            if window == 0 {
                return Err(crate::Error::FilterError("Window size must be greater than 0".to_string()));
            }
            Ok(Box::new(moving_average::MovingAverageFilter::new(window)))
        }
        _ => Err(crate::Error::FilterError(format!("Unknown filter type: {spec}"))),
    }
}

fn parse_param<T: std::str::FromStr>(param: Option<&str>, default: T) -> Result<T> {
    match param {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| crate::Error::FilterError(format!("Invalid filter parameter: {raw}"))),
    }
}
