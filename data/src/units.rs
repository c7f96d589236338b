//! Unit conversions
//!
//! Spatial quantities are expressed in µm and durations in ms, as the engine
//! under test does, but the diffusion constant is given in SI units (m²/s).
//! Anything that mixes the two must go through these factors.

use crate::Precision;

/// Number of meters in a micrometer
pub const METERS_PER_MICROMETER: Precision = 1e-6;

/// Number of seconds in a millisecond
pub const SECONDS_PER_MILLISECOND: Precision = 1e-3;

/// Convert a length from µm to m
#[inline]
pub fn micrometers_to_meters(length: Precision) -> Precision {
    length * METERS_PER_MICROMETER
}

/// Convert a duration from ms to s
#[inline]
pub fn milliseconds_to_seconds(duration: Precision) -> Precision {
    duration * SECONDS_PER_MILLISECOND
}

/// Crank-Nicolson coefficient `D·dt / (2·dx²)`, dimensionless
///
/// `diffusion_constant` is in m²/s, `time_step` in ms and `cell_width` in µm.
pub fn crank_nicolson_alpha(
    diffusion_constant: Precision,
    time_step: Precision,
    cell_width: Precision,
) -> Precision {
    let dt = milliseconds_to_seconds(time_step);
    let dx = micrometers_to_meters(cell_width);
    diffusion_constant * dt / (2.0 * dx * dx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_scenario_alpha() {
        // 1e-9 m²/s, 0.01 ms, 0.1 µm
        let alpha = crank_nicolson_alpha(1e-9, 0.01, 0.1);
        assert!((alpha - 0.5).abs() < 1e-12, "alpha = {alpha}");
    }

    #[test]
    fn forgetting_the_conversion_is_off_by_orders_of_magnitude() {
        let raw = 1e-9 * 0.01 / (2.0 * 0.1 * 0.1);
        let converted = crank_nicolson_alpha(1e-9, 0.01, 0.1);
        assert!(converted / raw > 1e8);
    }
}
