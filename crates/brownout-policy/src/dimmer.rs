//! Two-sided hysteresis between admission throttling and fleet size.
//!
//! Overload first tries to add a server and only dims when it cannot.
//! Underload first restores the dimmer and only then sheds a server, and
//! only when at least one whole server of slack exists.

use tracing::debug;

use brownout_core::{ActionBatch, ObservationSnapshot, Tactic};

/// Dimmer/server hysteresis controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimmerController;

impl DimmerController {
    pub fn new() -> Self {
        Self
    }

    /// Append at most one tactic to `batch` and return the resulting dimmer factor.
    ///
    /// `risk` is `None` for the response-time-only policy. When present, a
    /// risk above the spare utilization counts as overload, and underload
    /// additionally requires `risk <= spare`.
    ///
    /// Servers already added earlier in `batch` count as booting. If `batch`
    /// already sheds servers, overload dims instead of adding one back.
    pub fn adjust(&self, batch: &mut ActionBatch, snapshot: &ObservationSnapshot, risk: Option<f64>) -> f64 {
        let dimmer = snapshot.dimmer_factor.clamp(0.0, 1.0);
        let step = snapshot.dimmer_step();
        let spare = snapshot.spare_utilization();
        let response_time = snapshot.avg_response_time;
        let threshold = snapshot.response_time_threshold;

        let pending_adds = batch.pending_additions();
        let pending_removals = batch.pending_removals();
        let booting = snapshot.is_booting() || pending_adds > 0;
        let shrinking = pending_removals > 0;
        let provisioned = snapshot
            .provisioned_servers
            .saturating_add(pending_adds)
            .saturating_sub(pending_removals);
        let active = snapshot.active_servers.saturating_sub(pending_removals);

        let overloaded = response_time > threshold || risk.is_some_and(|r| r > spare);
        let underloaded = response_time < threshold && risk.is_none_or(|r| r <= spare);

        if overloaded {
            if !booting && !shrinking && provisioned < snapshot.max_servers {
                debug!(response_time, threshold, ?risk, spare, "overload: adding server");
                batch.push(Tactic::AddServer);
            } else if dimmer > 0.0 {
                let level = (dimmer - step).max(0.0);
                debug!(response_time, threshold, ?risk, level, "overload: lowering dimmer");
                batch.push(Tactic::SetDimmer { level });
                return level;
            }
        } else if underloaded && spare > 1.0 {
            if dimmer < 1.0 {
                let level = (dimmer + step).min(1.0);
                debug!(response_time, threshold, spare, level, "underload: raising dimmer");
                batch.push(Tactic::SetDimmer { level });
                return level;
            } else if !booting && active > 1 {
                debug!(response_time, threshold, spare, "underload: removing server");
                batch.push(Tactic::RemoveServer);
            }
        }

        dimmer
    }
}
