//! Adaptation history carried across control cycles.

use serde::{Deserialize, Serialize};

/// Counters that survive from one cycle to the next.
///
/// Mutated only by the capacity adjuster and the chaos injector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdaptationState {
    /// Standby servers currently provisioned on top of the reactive fleet.
    pub current_extra_servers: u32,
    /// Servers requested by the capacity adjuster over the lifetime of the manager.
    pub total_servers_created: u64,
    /// Servers removed by chaos injection.
    pub total_failed_servers: u64,
    /// Clock value of the most recent chaos removal.
    pub time_at_last_failed_server: Option<f64>,
}

impl AdaptationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_failure(&mut self, now: f64) {
        self.total_failed_servers += 1;
        self.time_at_last_failed_server = Some(now);
    }
}
