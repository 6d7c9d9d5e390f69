//! Adaptation policies. Each one assembles a single cycle's tactics.
//!
//! Both policies share the same shape: a chaos draw that may short-circuit
//! the cycle, followed by their own decision logic. Tactics are appended in
//! a fixed order (standby reconciliation, then dimmer hysteresis), which is
//! also the order the executor applies them.

use rand::Rng;
use rand::rngs::StdRng;
use tracing::debug;

use brownout_core::config::RiskModel;
use brownout_core::{ActionBatch, ObservationSnapshot};

use crate::capacity::CapacityAdjuster;
use crate::chaos::ChaosInjector;
use crate::dimmer::DimmerController;
use crate::level::AdaptationLevelCalculator;
use crate::risk::RiskEstimator;
use crate::state::AdaptationState;

/// A decision procedure run once per control cycle.
pub trait Policy: Send {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    /// Compute this cycle's tactics from the snapshot and adaptation history.
    fn evaluate(&mut self, snapshot: &ObservationSnapshot, history: &mut AdaptationState) -> ActionBatch;
}

/// Run the chaos draw, if chaos is enabled.
///
/// Returns a batch holding only the removal when a failure is injected.
fn inject_chaos<R: Rng>(
    chaos: Option<&mut ChaosInjector<R>>,
    snapshot: &ObservationSnapshot,
    history: &mut AdaptationState,
) -> Option<ActionBatch> {
    let tactic = chaos?.maybe_inject_failure(snapshot, history)?;
    let mut batch = ActionBatch::new();
    batch.push(tactic);
    Some(batch)
}

// ── Reactive ──────────────────────────────────────────────────────

/// Response-time hysteresis with no risk term and no standby servers.
///
/// - response time above threshold: add a server if possible, else dim
/// - below threshold with more than one spare server: undim, else remove a server
pub struct ReactivePolicy<R = StdRng> {
    chaos: Option<ChaosInjector<R>>,
    dimmer: DimmerController,
}

impl<R: Rng> ReactivePolicy<R> {
    pub fn new(chaos: Option<ChaosInjector<R>>) -> Self {
        Self {
            chaos,
            dimmer: DimmerController::new(),
        }
    }
}

impl<R: Rng + Send> Policy for ReactivePolicy<R> {
    fn name(&self) -> &'static str {
        "reactive"
    }

    fn evaluate(&mut self, snapshot: &ObservationSnapshot, history: &mut AdaptationState) -> ActionBatch {
        if let Some(batch) = inject_chaos(self.chaos.as_mut(), snapshot, history) {
            return batch;
        }

        let mut batch = ActionBatch::new();
        self.dimmer.adjust(&mut batch, snapshot, None);
        batch
    }
}

// ── Risk-aware ────────────────────────────────────────────────────

/// Reactive hysteresis augmented with failure risk.
///
/// A positive risk provisions standby servers in proportion to the active
/// fleet, and risk above the spare utilization is treated as overload.
pub struct RiskAwarePolicy<R = StdRng> {
    chaos: Option<ChaosInjector<R>>,
    estimator: RiskEstimator,
    levels: AdaptationLevelCalculator,
    capacity: CapacityAdjuster,
    dimmer: DimmerController,
}

impl<R: Rng> RiskAwarePolicy<R> {
    pub fn new(model: RiskModel, chaos: Option<ChaosInjector<R>>) -> Self {
        Self {
            chaos,
            estimator: RiskEstimator::new(model),
            levels: AdaptationLevelCalculator::new(),
            capacity: CapacityAdjuster::new(),
            dimmer: DimmerController::new(),
        }
    }

    pub fn risk_model(&self) -> RiskModel {
        self.estimator.model()
    }
}

impl<R: Rng + Send> Policy for RiskAwarePolicy<R> {
    fn name(&self) -> &'static str {
        "risk_aware"
    }

    fn evaluate(&mut self, snapshot: &ObservationSnapshot, history: &mut AdaptationState) -> ActionBatch {
        if let Some(batch) = inject_chaos(self.chaos.as_mut(), snapshot, history) {
            return batch;
        }

        let mut batch = ActionBatch::new();
        let risk = self.estimator.estimate(snapshot, history);

        if risk > 0.0 {
            let wanted = self
                .levels
                .target_extra_servers(risk, snapshot.active_servers);
            let target = self
                .capacity
                .clamp_target(wanted, history.current_extra_servers, snapshot);
            debug!(
                risk,
                wanted,
                target,
                current = history.current_extra_servers,
                "standby target"
            );
            self.capacity.reconcile(&mut batch, history, target);
        }

        self.dimmer.adjust(&mut batch, snapshot, Some(risk));
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brownout_core::Tactic;

    fn scenario() -> ObservationSnapshot {
        ObservationSnapshot {
            active_servers: 10,
            provisioned_servers: 10,
            max_servers: 20,
            configured_capacity_units: 10.0,
            utilization: 6.0,
            avg_response_time: 500.0,
            response_time_threshold: 200.0,
            dimmer_factor: 1.0,
            dimmer_level_count: 6,
            chaos_coefficient: 0.0,
            boot_delay: 60.0,
            current_time: 600.0,
        }
    }

    fn chaos(seed: u64) -> Option<ChaosInjector> {
        Some(ChaosInjector::from_seed(Some(seed)))
    }

    #[test]
    fn overload_without_chaos_adds_one_server() {
        for mut policy in [
            Box::new(ReactivePolicy::new(chaos(1))) as Box<dyn Policy>,
            Box::new(RiskAwarePolicy::new(RiskModel::Binomial, chaos(1))),
        ] {
            let mut history = AdaptationState::new();
            let batch = policy.evaluate(&scenario(), &mut history);
            assert_eq!(batch.as_slice(), &[Tactic::AddServer], "policy {}", policy.name());
        }
    }

    #[test]
    fn overload_at_max_dims() {
        let snap = ObservationSnapshot {
            provisioned_servers: 20,
            active_servers: 20,
            configured_capacity_units: 20.0,
            dimmer_factor: 0.5,
            ..scenario()
        };
        let mut policy = RiskAwarePolicy::new(RiskModel::Binomial, chaos(1));
        let mut history = AdaptationState::new();
        let batch = policy.evaluate(&snap, &mut history);
        match batch.as_slice() {
            [Tactic::SetDimmer { level }] => assert!((level - 0.3).abs() < 1e-9),
            other => panic!("unexpected batch {other:?}"),
        }
    }

    #[test]
    fn underload_removes_server() {
        let snap = ObservationSnapshot {
            active_servers: 5,
            provisioned_servers: 5,
            configured_capacity_units: 5.0,
            utilization: 2.5,
            avg_response_time: 100.0,
            ..scenario()
        };
        let mut policy = RiskAwarePolicy::new(RiskModel::Binomial, chaos(1));
        let mut history = AdaptationState::new();
        assert_eq!(
            policy.evaluate(&snap, &mut history).as_slice(),
            &[Tactic::RemoveServer]
        );
    }

    #[test]
    fn chaos_short_circuits_everything_else() {
        let snap = ObservationSnapshot {
            chaos_coefficient: 1.0,
            ..scenario()
        };
        let mut policy = RiskAwarePolicy::new(RiskModel::Binomial, chaos(5));
        let mut history = AdaptationState::new();

        let batch = policy.evaluate(&snap, &mut history);

        assert_eq!(batch.as_slice(), &[Tactic::RemoveServer]);
        assert_eq!(history.total_failed_servers, 1);
        assert_eq!(history.current_extra_servers, 0);
    }

    #[test]
    fn disabled_chaos_never_fires() {
        let snap = ObservationSnapshot {
            chaos_coefficient: 1.0,
            avg_response_time: 200.0,
            utilization: 9.5,
            ..scenario()
        };
        let mut policy = ReactivePolicy::<StdRng>::new(None);
        let mut history = AdaptationState::new();
        assert!(policy.evaluate(&snap, &mut history).is_empty());
        assert_eq!(history.total_failed_servers, 0);
    }

    #[test]
    fn risk_provisions_standby_before_dimmer_tactics() {
        // Four failures in 1200s with a 400s boot delay -> MTBF 300, risk 400/700 ≈ 0.57.
        let snap = ObservationSnapshot {
            active_servers: 20,
            provisioned_servers: 20,
            max_servers: 40,
            configured_capacity_units: 20.0,
            utilization: 10.0,
            avg_response_time: 500.0,
            boot_delay: 400.0,
            current_time: 1_200.0,
            ..scenario()
        };
        let mut history = AdaptationState {
            total_failed_servers: 4,
            ..AdaptationState::default()
        };
        let mut policy = RiskAwarePolicy::new(RiskModel::EmpiricalMtbf, chaos(9));

        let batch = policy.evaluate(&snap, &mut history);

        // ceil(20 * 0.15) = 3 standby servers, then the overload branch sees
        // them booting and dims instead of adding a fourth.
        assert_eq!(
            batch.as_slice(),
            &[
                Tactic::AddServer,
                Tactic::AddServer,
                Tactic::AddServer,
                Tactic::SetDimmer { level: 0.8 },
            ]
        );
        assert_eq!(history.current_extra_servers, 3);
        assert_eq!(history.total_servers_created, 3);
    }

    #[test]
    fn mid_risk_band_reconciles_three_standby_servers() {
        let levels = AdaptationLevelCalculator::new();
        let capacity = CapacityAdjuster::new();
        let mut history = AdaptationState::new();
        let mut batch = ActionBatch::new();

        let target = levels.target_extra_servers(0.5, 20);
        capacity.reconcile(&mut batch, &mut history, target);

        assert_eq!(target, 3);
        assert_eq!(batch.as_slice(), &[Tactic::AddServer; 3]);
        assert_eq!(history.current_extra_servers, 3);
    }

    #[test]
    fn standby_target_is_bounded_by_max_servers() {
        let snap = ObservationSnapshot {
            active_servers: 19,
            provisioned_servers: 19,
            max_servers: 20,
            configured_capacity_units: 19.0,
            utilization: 5.0,
            avg_response_time: 100.0,
            chaos_coefficient: 0.2,
            ..scenario()
        };
        // Chaos draws stay disabled so only the risk term acts.
        let mut policy = RiskAwarePolicy::<StdRng>::new(RiskModel::Binomial, None);
        let mut history = AdaptationState::new();

        let batch = policy.evaluate(&snap, &mut history);

        assert_eq!(batch.pending_additions(), 1);
        assert_eq!(history.current_extra_servers, 1);
    }

    #[test]
    fn shedding_standby_under_overload_dims_instead_of_adding() {
        // 1 - 0.99^10 is about 0.096, so the target drops from 3 standby to 1.
        let snap = ObservationSnapshot {
            chaos_coefficient: 0.01,
            ..scenario()
        };
        let mut policy = RiskAwarePolicy::<StdRng>::new(RiskModel::Binomial, None);
        let mut history = AdaptationState {
            current_extra_servers: 3,
            ..AdaptationState::default()
        };

        let batch = policy.evaluate(&snap, &mut history);

        assert_eq!(batch.pending_removals(), 2);
        assert_eq!(batch.pending_additions(), 0);
        match batch.as_slice() {
            [Tactic::RemoveServer, Tactic::RemoveServer, Tactic::SetDimmer { level }] => {
                assert!((level - 0.8).abs() < 1e-9)
            }
            other => panic!("unexpected batch {other:?}"),
        }
        assert_eq!(history.current_extra_servers, 1);
    }
}
