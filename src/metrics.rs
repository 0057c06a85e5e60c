//! Stateless training-load formulas
//!
//! Series are `(time_seconds, value)` samples in non-decreasing time order.
//! Each value is held until the next sample (zero-order hold), so irregular
//! sampling rates and recording gaps are weighted by the time they cover.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{debug, warn};

use crate::error::{Result, StrideError};

/// Default rolling window for normalized power, in seconds
pub const DEFAULT_SMOOTHING_WINDOW: f64 = 30.0;

/// Outcome of a normalized power (or pace/heart rate) calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPower {
    pub value: f64,
    /// The series was shorter than one window and the simple mean was used instead
    pub fallback: bool,
}

/// Normalized power: fourth-power mean of the time-weighted rolling average.
///
/// The rolling average is evaluated at every sample at least one full window
/// after the first sample. When the series spans less than one window the
/// simple mean is returned and `fallback` is set.
///
/// The first window only enters the rolling averages of later samples and the
/// last sample enters none, so a series whose hardest effort sits in the first
/// window or the final seconds can normalize below its simple mean. Once the
/// opening and closing window are no harder than the rest, the result is at
/// least the simple mean.
pub fn normalized_power(series: &[(f64, f64)], smoothing_window: f64) -> Result<NormalizedPower> {
    if !(smoothing_window.is_finite() && smoothing_window > 0.0) {
        return Err(StrideError::invalid(
            "normalized power",
            "smoothing_window",
            smoothing_window,
        ));
    }
    if series.is_empty() {
        return Err(StrideError::insufficient(
            "normalized power",
            "series is empty",
        ));
    }

    let rolling = rolling_mean(series, smoothing_window);

    if rolling.is_empty() {
        let span = series[series.len() - 1].0 - series[0].0;
        warn!(
            span_seconds = span,
            window_seconds = smoothing_window,
            "Series shorter than smoothing window, using simple mean for normalized power"
        );
        let value = Statistics::mean(series.iter().map(|&(_, v)| v));
        return Ok(NormalizedPower {
            value,
            fallback: true,
        });
    }

    // Raise each rolling value to the 4th power, average, take the 4th root
    let avg_fourth_power = Statistics::mean(rolling.iter().map(|v| v.powi(4)));
    let value = avg_fourth_power.sqrt().sqrt();

    debug!(
        samples = series.len(),
        evaluated = rolling.len(),
        value,
        "Calculated normalized power"
    );

    Ok(NormalizedPower {
        value,
        fallback: false,
    })
}

/// Time-weighted mean over `(t - window, t]` at each sample `t >= t0 + window`
fn rolling_mean(series: &[(f64, f64)], window: f64) -> Vec<f64> {
    let t0 = series[0].0;

    // integral[i] = area under the held signal from t0 to series[i].0
    let mut integral = Vec::with_capacity(series.len());
    integral.push(0.0);
    for pair in series.windows(2) {
        let (t_prev, v_prev) = pair[0];
        let (t, _) = pair[1];
        let last = integral[integral.len() - 1];
        integral.push(last + v_prev * (t - t_prev));
    }

    let area_until = |k: usize, x: f64| integral[k] + series[k].1 * (x - series[k].0);

    let mut out = Vec::new();
    let mut k = 0;
    for (j, &(t, _)) in series.iter().enumerate() {
        if t - t0 < window {
            continue;
        }
        let start = t - window;
        while k + 1 < series.len() && series[k + 1].0 <= start {
            k += 1;
        }
        out.push((integral[j] - area_until(k, start)) / window);
    }
    out
}

/// Fourth-power mean without smoothing, used for heart rate
pub fn lactate_norm(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(StrideError::insufficient("lactate norm", "series is empty"));
    }
    let avg_fourth_power = Statistics::mean(values.iter().map(|v| v.powi(4)));
    Ok(avg_fourth_power.sqrt().sqrt())
}

/// Ratio of an effort metric to the athlete's threshold
pub fn intensity(value: f64, threshold: f64) -> Result<f64> {
    if !(threshold.is_finite() && threshold > 0.0) {
        return Err(StrideError::invalid("intensity", "threshold", threshold));
    }
    Ok(value / threshold)
}

/// Training stress score: `100 * hours * intensity^2`
pub fn training_stress(normalized_metric: f64, threshold: f64, duration_seconds: f64) -> Result<f64> {
    if !(duration_seconds.is_finite() && duration_seconds >= 0.0) {
        return Err(StrideError::invalid(
            "training stress",
            "duration_seconds",
            duration_seconds,
        ));
    }
    let intensity_factor = intensity(normalized_metric, threshold)?;
    Ok(100.0 * (duration_seconds / 3600.0) * intensity_factor.powi(2))
}
