//! Banded proportional scaling of standby capacity.
//!
//! | risk         | extra servers (fraction of active) |
//! |--------------|------------------------------------|
//! | (0.0, 0.2)   | 5%                                 |
//! | [0.2, 0.4)   | 10%                                |
//! | [0.4, 0.6)   | 15%                                |
//! | [0.6, 0.8)   | 20%                                |
//! | [0.8, 1.0]   | 25%                                |
//!
//! Targets are rounded up, so any positive risk on a non-empty fleet asks
//! for at least one standby server.

/// Upper band edges (exclusive) paired with the fraction applied below them.
const BANDS: [(f64, f64); 4] = [(0.2, 0.05), (0.4, 0.10), (0.6, 0.15), (0.8, 0.20)];

/// Fraction applied from 0.8 upward.
const TOP_BAND_FRACTION: f64 = 0.25;

/// Maps a risk value to a target number of extra servers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptationLevelCalculator;

impl AdaptationLevelCalculator {
    pub fn new() -> Self {
        Self
    }

    /// `ceil(active_servers * fraction(risk))`; zero when risk is not positive.
    pub fn target_extra_servers(&self, risk: f64, active_servers: u32) -> u32 {
        let fraction = band_fraction(risk);
        (f64::from(active_servers) * fraction).ceil() as u32
    }
}

fn band_fraction(risk: f64) -> f64 {
    if risk.is_nan() || risk <= 0.0 {
        return 0.0;
    }
    BANDS
        .iter()
        .find(|(upper, _)| risk < *upper)
        .map_or(TOP_BAND_FRACTION, |(_, fraction)| *fraction)
}
