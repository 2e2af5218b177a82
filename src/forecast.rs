//! Sales forecasting.
//!
//! Produces a continuation of a numeric series via exponential smoothing.
//! A model name containing "holt" selects the linear-trend variant; anything
//! else gets single exponential smoothing with a flat continuation.

use crate::errors::AppError;

const ALPHA: f64 = 0.3;
/// Trend smoothing factor for the Holt variant.
const BETA: f64 = 0.1;
/// Upper bound on the forecast horizon; the output vector is allocated
/// per request, so the horizon must not be caller-controlled without limit.
pub const MAX_PERIODS: usize = 1_000;

/// Forecasts `periods` future values for `series`.
///
/// Fails on an empty series, an out-of-range horizon, or non-finite inputs.
/// The caller maps the input errors to HTTP 400 and everything else to
/// HTTP 500.
pub fn forecast(series: &[f64], periods: usize, model: &str) -> Result<Vec<f64>, AppError> {
    if series.is_empty() {
        return Err(AppError::BadRequest("No data provided".to_string()));
    }
    if periods > MAX_PERIODS {
        return Err(AppError::BadRequest(format!(
            "Too many periods requested (max {})",
            MAX_PERIODS
        )));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(AppError::InternalError(
            "Series contains non-finite values".to_string(),
        ));
    }

    let values = if model.to_lowercase().contains("holt") {
        holt_linear(series, periods)
    } else {
        simple_exponential(series, periods)
    };

    Ok(values)
}

/// Single exponential smoothing: the forecast is the final smoothed level,
/// repeated.
fn simple_exponential(series: &[f64], periods: usize) -> Vec<f64> {
    let mut level = series[0];
    for value in &series[1..] {
        level = ALPHA * value + (1.0 - ALPHA) * level;
    }
    vec![level; periods]
}

/// Holt's linear-trend smoothing: level plus an extrapolated trend per step.
fn holt_linear(series: &[f64], periods: usize) -> Vec<f64> {
    if series.len() < 2 {
        return simple_exponential(series, periods);
    }

    let mut level = series[0];
    let mut trend = series[1] - series[0];
    for value in &series[1..] {
        let prev_level = level;
        level = ALPHA * value + (1.0 - ALPHA) * (level + trend);
        trend = BETA * (level - prev_level) + (1.0 - BETA) * trend;
    }

    (1..=periods).map(|h| level + trend * h as f64).collect()
}
