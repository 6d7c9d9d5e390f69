//! Simulation driver: advances the clock and runs one control cycle per period.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use brownout_core::{
    ActionBatch, BrownoutConfig, ConfigResult, ObservationSnapshot, ObservationSource, Tactic,
    TacticExecutor,
};
use brownout_policy::{AdaptationManager, AdaptationState};

use crate::fleet::FleetModel;
use crate::workload::{WorkloadModel, WorkloadSample};

/// What happened in one control cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// One-based cycle number.
    pub cycle: u64,
    pub snapshot: ObservationSnapshot,
    pub batch: ActionBatch,
    /// Tactics from `batch` the fleet refused to apply.
    pub rejected: usize,
}

/// Aggregates over a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub policy: String,
    pub cycles: u64,
    pub servers_added: u64,
    pub servers_removed: u64,
    pub dimmer_changes: u64,
    pub rejected_tactics: u64,
    pub final_active_servers: u32,
    pub final_provisioned_servers: u32,
    pub final_dimmer: f64,
    pub mean_response_time: f64,
    /// Fraction of cycles whose response time exceeded the threshold.
    pub overloaded_fraction: f64,
    pub adaptation: AdaptationState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub cycles: Vec<CycleReport>,
    pub summary: SimulationSummary,
}

pub struct Simulation {
    config: BrownoutConfig,
    manager: AdaptationManager,
    fleet: FleetModel,
    workload: WorkloadModel,
    /// Cycles completed so far.
    cycle: u64,
    last_sample: WorkloadSample,
}

impl Simulation {
    /// Validate `config` and build the manager it selects.
    pub fn new(config: BrownoutConfig) -> ConfigResult<Self> {
        config.validate()?;
        let manager = AdaptationManager::from_config(&config.policy);
        Ok(Self::with_manager(config, manager))
    }

    /// Drive an already-built manager. `config` is assumed valid.
    pub fn with_manager(config: BrownoutConfig, manager: AdaptationManager) -> Self {
        let fleet = FleetModel::new(&config.fleet);
        let workload = WorkloadModel::new(config.workload.clone());
        let last_sample = workload.sample(0, fleet.active_servers(), fleet.dimmer());
        Self {
            config,
            manager,
            fleet,
            workload,
            cycle: 0,
            last_sample,
        }
    }

    pub fn fleet(&self) -> &FleetModel {
        &self.fleet
    }

    pub fn manager(&self) -> &AdaptationManager {
        &self.manager
    }

    /// Advance one evaluation period and run one control cycle.
    pub fn step(&mut self) -> CycleReport {
        let now = (self.cycle + 1) as f64 * self.config.fleet.evaluation_period;
        self.fleet.advance_to(now);
        self.last_sample = self.workload.sample(
            self.cycle,
            self.fleet.active_servers(),
            self.fleet.dimmer(),
        );
        self.cycle += 1;

        let snapshot = self.observe();
        let batch = self.manager.evaluate(&snapshot);

        let mut rejected = 0;
        for tactic in &batch {
            if !self.fleet.execute(tactic) {
                rejected += 1;
            }
        }

        debug!(
            cycle = self.cycle,
            now,
            arrival_rate = self.last_sample.arrival_rate,
            response_time = snapshot.avg_response_time,
            tactics = %batch,
            rejected,
            "simulation step"
        );

        CycleReport {
            cycle: self.cycle,
            snapshot,
            batch,
            rejected,
        }
    }

    /// Run `cycles` control cycles and summarize them.
    pub fn run(&mut self, cycles: u64) -> SimulationReport {
        info!(
            cycles,
            policy = self.manager.policy_name(),
            max_servers = self.config.fleet.max_servers,
            "simulation started"
        );

        let reports: Vec<CycleReport> = (0..cycles).map(|_| self.step()).collect();
        let summary = self.summarize(&reports);

        info!(
            cycles = summary.cycles,
            added = summary.servers_added,
            removed = summary.servers_removed,
            failures = summary.adaptation.total_failed_servers,
            mean_response_time = summary.mean_response_time,
            "simulation finished"
        );

        SimulationReport {
            cycles: reports,
            summary,
        }
    }

    fn summarize(&self, reports: &[CycleReport]) -> SimulationSummary {
        let mut servers_added = 0;
        let mut servers_removed = 0;
        let mut dimmer_changes = 0;
        for tactic in reports.iter().flat_map(|r| r.batch.iter()) {
            match tactic {
                Tactic::AddServer => servers_added += 1,
                Tactic::RemoveServer => servers_removed += 1,
                Tactic::SetDimmer { .. } => dimmer_changes += 1,
            }
        }

        let cycles = reports.len() as u64;
        let (mean_response_time, overloaded_fraction) = if reports.is_empty() {
            (0.0, 0.0)
        } else {
            let n = reports.len() as f64;
            let total: f64 = reports.iter().map(|r| r.snapshot.avg_response_time).sum();
            let overloaded = reports
                .iter()
                .filter(|r| r.snapshot.avg_response_time > r.snapshot.response_time_threshold)
                .count() as f64;
            (total / n, overloaded / n)
        };

        SimulationSummary {
            policy: self.manager.policy_name().to_string(),
            cycles,
            servers_added,
            servers_removed,
            dimmer_changes,
            rejected_tactics: reports.iter().map(|r| r.rejected as u64).sum(),
            final_active_servers: self.fleet.active_servers(),
            final_provisioned_servers: self.fleet.provisioned_servers(),
            final_dimmer: self.fleet.dimmer(),
            mean_response_time,
            overloaded_fraction,
            adaptation: self.manager.state().clone(),
        }
    }
}

impl ObservationSource for Simulation {
    fn observe(&self) -> ObservationSnapshot {
        let active = self.fleet.active_servers();
        ObservationSnapshot {
            active_servers: active,
            provisioned_servers: self.fleet.provisioned_servers(),
            max_servers: self.fleet.max_servers(),
            configured_capacity_units: f64::from(active),
            utilization: self.last_sample.utilization,
            avg_response_time: self.last_sample.avg_response_time,
            response_time_threshold: self.config.policy.response_time_threshold,
            dimmer_factor: self.fleet.dimmer(),
            dimmer_level_count: self.config.fleet.dimmer_levels,
            chaos_coefficient: self.config.fleet.chaos_coefficient,
            boot_delay: self.fleet.boot_delay(),
            current_time: self.fleet.now(),
        }
    }
}
