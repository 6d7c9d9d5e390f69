//! Reconciles standby capacity against a target.

use tracing::debug;

use brownout_core::{ActionBatch, ObservationSnapshot, Tactic};

use crate::state::AdaptationState;

/// Emits the minimal run of add/remove tactics that moves
/// `current_extra_servers` to a target.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityAdjuster;

impl CapacityAdjuster {
    pub fn new() -> Self {
        Self
    }

    /// Bound `target` by what the fleet can absorb this cycle.
    ///
    /// Additions stop once `provisioned_servers` would reach `max_servers`;
    /// removals stop before `active_servers` would drop below 1.
    pub fn clamp_target(&self, target: u32, current: u32, snapshot: &ObservationSnapshot) -> u32 {
        if target > current {
            let headroom = snapshot
                .max_servers
                .saturating_sub(snapshot.provisioned_servers);
            target.min(current.saturating_add(headroom))
        } else {
            let removable = snapshot.active_servers.saturating_sub(1);
            target.max(current.saturating_sub(removable))
        }
    }

    /// Append tactics to `batch` until `current_extra_servers == target`.
    ///
    /// The counter is updated once per appended tactic, so it always matches
    /// the tactics emitted so far.
    pub fn reconcile(&self, batch: &mut ActionBatch, history: &mut AdaptationState, target: u32) {
        let current = history.current_extra_servers;
        if target == current {
            return;
        }

        debug!(current, target, "reconciling standby capacity");

        if target > current {
            for _ in 0..target - current {
                batch.push(Tactic::AddServer);
                history.current_extra_servers += 1;
                history.total_servers_created += 1;
            }
        } else {
            for _ in 0..current - target {
                batch.push(Tactic::RemoveServer);
                history.current_extra_servers -= 1;
            }
        }
    }
}
