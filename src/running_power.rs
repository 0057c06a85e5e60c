//! Metabolic power of running from speed and grade
//!
//! Cost of running on a slope follows Minetti (2002), valid between -45% and
//! +45% grade, plus an aerodynamic term `(k / eta) * v^2` after Pugh (1971).
//! Power is cost times speed, in W/kg.

use crate::error::{Result, StrideError};

/// Air friction coefficient, m^-1
const AIR_FRICTION: f64 = 0.01;
/// Efficiency of working against a headwind
const AERO_EFFICIENCY: f64 = 0.5;
/// Grades beyond this are clamped
const MAX_GRADE: f64 = 0.45;

const METERS_PER_MILE: f64 = 1609.34;

/// Metabolic cost of running in J/kg/m
pub fn run_cost(speed: f64, grade: f64) -> f64 {
    let g = grade.clamp(-MAX_GRADE, MAX_GRADE);
    let incline = 155.4 * g.powi(5) - 30.4 * g.powi(4) - 43.3 * g.powi(3)
        + 46.3 * g.powi(2)
        + 19.5 * g
        + 3.6;
    let aero = AIR_FRICTION / AERO_EFFICIENCY * speed.powi(2);
    incline + aero
}

/// Instantaneous running power in W/kg
pub fn run_power(speed: f64, grade: f64) -> f64 {
    run_cost(speed, grade) * speed
}

/// Power on flat ground at the given speed, in W/kg
pub fn flat_run_power(speed: f64) -> f64 {
    run_power(speed, 0.0)
}

/// Flat-ground speed in m/s that requires the given power (inverse of [`flat_run_power`])
pub fn flat_speed(power: f64) -> f64 {
    let value = (25.0 * power.powi(2) + 8640.0).sqrt() + 5.0 * power;
    (5f64.cbrt() * value.powf(2.0 / 3.0) - 12.0 * 5f64.powf(2.0 / 3.0)) / value.cbrt()
}

/// Parse a `M:SS` per-mile pace into meters per second
pub fn pace_to_speed(pace: &str) -> Result<f64> {
    let invalid = || StrideError::invalid("pace conversion", "pace", pace);

    let (minutes, seconds) = pace.trim().split_once(':').ok_or_else(invalid)?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    let seconds: u32 = seconds.parse().map_err(|_| invalid())?;
    if seconds >= 60 {
        return Err(invalid());
    }

    let total = minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(invalid)?;
    if total == 0 {
        return Err(invalid());
    }
    Ok(METERS_PER_MILE / total as f64)
}

/// Flat-ground power for a `M:SS` per-mile pace
pub fn flat_run_power_from_pace(pace: &str) -> Result<f64> {
    Ok(flat_run_power(pace_to_speed(pace)?))
}
