//! Utilization and response time from offered load.
//!
//! Not a queueing simulator: each server is treated as an M/M/1 queue fed
//! an equal share of the arrivals, which is enough to make response time
//! rise sharply as the fleet saturates.

use serde::{Deserialize, Serialize};

use brownout_core::config::WorkloadConfig;

/// Per-server load above which response time stops growing.
const MAX_LOAD: f64 = 0.99;

/// Load observed over one evaluation period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSample {
    pub arrival_rate: f64,
    /// Busy capacity in server-equivalents, capped at the active fleet.
    pub utilization: f64,
    pub avg_response_time: f64,
}

#[derive(Debug, Clone)]
pub struct WorkloadModel {
    config: WorkloadConfig,
}

impl WorkloadModel {
    pub fn new(config: WorkloadConfig) -> Self {
        Self { config }
    }

    /// Mean service time when a `dimmer` fraction of responses carry full content.
    pub fn service_time(&self, dimmer: f64) -> f64 {
        let d = dimmer.clamp(0.0, 1.0);
        d * self.config.service_time + (1.0 - d) * self.config.optional_service_time
    }

    /// Sample the load for `cycle` on `active_servers` servers at the given dimmer.
    pub fn sample(&self, cycle: u64, active_servers: u32, dimmer: f64) -> WorkloadSample {
        let arrival_rate = self.config.arrival_rate_at(cycle);
        let service_time = self.service_time(dimmer);
        let offered = arrival_rate * service_time;

        if active_servers == 0 {
            return WorkloadSample {
                arrival_rate,
                utilization: 0.0,
                avg_response_time: service_time / (1.0 - MAX_LOAD),
            };
        }

        let servers = f64::from(active_servers);
        let load = (offered / servers).min(MAX_LOAD);
        WorkloadSample {
            arrival_rate,
            utilization: offered.min(servers),
            avg_response_time: service_time / (1.0 - load),
        }
    }
}
