//! Failure-risk estimation.
//!
//! Turns the chaos coefficient or the observed failure history into a
//! scalar risk in `[0, 1]`. Both models are pure functions of the snapshot
//! and the adaptation history.

use brownout_core::ObservationSnapshot;
use brownout_core::config::RiskModel;

use crate::state::AdaptationState;

/// Estimates the risk of losing capacity this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskEstimator {
    model: RiskModel,
}

impl RiskEstimator {
    pub fn new(model: RiskModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> RiskModel {
        self.model
    }

    /// Risk in `[0, 1]` for the current cycle.
    pub fn estimate(&self, snapshot: &ObservationSnapshot, history: &AdaptationState) -> f64 {
        let risk = match self.model {
            RiskModel::Binomial => {
                binomial_risk(snapshot.chaos_coefficient, snapshot.active_servers)
            }
            RiskModel::EmpiricalMtbf => mtbf_risk(
                snapshot.current_time,
                history.total_failed_servers,
                snapshot.boot_delay,
            ),
        };
        risk.clamp(0.0, 1.0)
    }
}

/// Probability that at least one of `servers` fails, each independently
/// with probability `p`.
pub fn binomial_risk(p: f64, servers: u32) -> f64 {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    let exponent = i32::try_from(servers).unwrap_or(i32::MAX);
    1.0 - (1.0 - p).powi(exponent)
}

/// Steady-state unavailability `mttr / (mtbf + mttr)`.
///
/// The mean time between failures comes from the observed failure count;
/// the repair time is the boot delay of a replacement server.
pub fn mtbf_risk(now: f64, failures: u64, boot_delay: f64) -> f64 {
    if failures == 0 {
        return 0.0;
    }
    let mtbf = now.max(0.0) / failures as f64;
    let mttr = boot_delay.max(0.0);
    if mtbf + mttr <= 0.0 {
        return 0.0;
    }
    1.0 - mtbf / (mtbf + mttr)
}
