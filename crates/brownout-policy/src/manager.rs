//! The single entry point called once per control cycle.
//!
//! Owns the selected [`Policy`] and the [`AdaptationState`] it mutates.
//! `evaluate` takes `&mut self`, so a manager can only ever run one cycle
//! at a time; independent fleets get independent managers.

use tracing::{debug, info};

use brownout_core::config::{PolicyConfig, PolicyKind};
use brownout_core::{ActionBatch, ObservationSnapshot};

use crate::chaos::ChaosInjector;
use crate::policy::{Policy, ReactivePolicy, RiskAwarePolicy};
use crate::state::AdaptationState;

pub struct AdaptationManager {
    policy: Box<dyn Policy>,
    state: AdaptationState,
    cycles: u64,
}

impl AdaptationManager {
    /// Create a manager around an already-built policy.
    pub fn new(policy: Box<dyn Policy>) -> Self {
        Self {
            policy,
            state: AdaptationState::new(),
            cycles: 0,
        }
    }

    /// Build the policy selected by `config`.
    pub fn from_config(config: &PolicyConfig) -> Self {
        let chaos = config
            .chaos_enabled
            .then(|| ChaosInjector::from_seed(config.chaos_seed));

        let policy: Box<dyn Policy> = match config.kind {
            PolicyKind::Reactive => Box::new(ReactivePolicy::new(chaos)),
            PolicyKind::RiskAware => Box::new(RiskAwarePolicy::new(config.risk_model, chaos)),
        };

        info!(
            policy = policy.name(),
            risk_model = ?config.risk_model,
            chaos = config.chaos_enabled,
            seed = ?config.chaos_seed,
            "adaptation manager initialized"
        );
        Self::new(policy)
    }

    /// Run one control cycle and return the tactics to apply, in order.
    pub fn evaluate(&mut self, snapshot: &ObservationSnapshot) -> ActionBatch {
        self.cycles += 1;
        let batch = self.policy.evaluate(snapshot, &mut self.state);
        debug!(
            cycle = self.cycles,
            policy = self.policy.name(),
            active = snapshot.active_servers,
            provisioned = snapshot.provisioned_servers,
            response_time = snapshot.avg_response_time,
            dimmer = snapshot.dimmer_factor,
            tactics = %batch,
            "cycle evaluated"
        );
        batch
    }

    pub fn state(&self) -> &AdaptationState {
        &self.state
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Number of cycles evaluated so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}
