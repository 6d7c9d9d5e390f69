//! Random, policy-independent server removal.
//!
//! Models an externally injected server crash. When the injector fires the
//! policy returns the single removal and evaluates nothing else that cycle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use brownout_core::{ObservationSnapshot, Tactic};

use crate::state::AdaptationState;

/// Decides once per cycle whether a server "crashes".
///
/// The coefficient is a per-cycle probability in `[0, 1]`, compared against
/// a uniform draw in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct ChaosInjector<R = StdRng> {
    rng: R,
}

impl ChaosInjector<StdRng> {
    /// Injector seeded for reproducible runs, or from the OS when `seed` is `None`.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl<R: Rng> ChaosInjector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw once and return a `RemoveServer` tactic if a failure is injected.
    ///
    /// Records the failure in `history`. Never removes the last active server.
    pub fn maybe_inject_failure(
        &mut self,
        snapshot: &ObservationSnapshot,
        history: &mut AdaptationState,
    ) -> Option<Tactic> {
        let draw: f64 = self.rng.random();
        if !should_fail(draw, snapshot.chaos_coefficient, snapshot.active_servers) {
            return None;
        }

        history.record_failure(snapshot.current_time);
        info!(
            draw,
            coefficient = snapshot.chaos_coefficient,
            active = snapshot.active_servers,
            failures = history.total_failed_servers,
            "chaos: injecting server failure"
        );
        Some(Tactic::RemoveServer)
    }
}

/// A draw in `[0, 1)` at or above `1 - coefficient` fails a server, provided
/// more than one is active.
fn should_fail(draw: f64, coefficient: f64, active_servers: u32) -> bool {
    active_servers > 1 && coefficient > 0.0 && draw >= 1.0 - coefficient
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(active: u32, chaos: f64) -> ObservationSnapshot {
        ObservationSnapshot {
            active_servers: active,
            provisioned_servers: active,
            max_servers: 20,
            configured_capacity_units: f64::from(active),
            utilization: 0.0,
            avg_response_time: 0.1,
            response_time_threshold: 0.75,
            dimmer_factor: 1.0,
            dimmer_level_count: 5,
            chaos_coefficient: chaos,
            boot_delay: 60.0,
            current_time: 360.0,
        }
    }

    #[test]
    fn threshold_comparison() {
        assert!(should_fail(0.95, 0.1, 3));
        assert!(should_fail(0.91, 0.1, 3));
        assert!(!should_fail(0.89, 0.1, 3));
        assert!(!should_fail(0.0, 0.0, 3));
        assert!(should_fail(0.0, 1.0, 2));
    }

    #[test]
    fn never_removes_last_server() {
        assert!(!should_fail(0.999, 1.0, 1));
        assert!(!should_fail(0.999, 1.0, 0));

        let mut chaos = ChaosInjector::from_seed(Some(7));
        let mut history = AdaptationState::new();
        for _ in 0..1_000 {
            assert_eq!(chaos.maybe_inject_failure(&snapshot(1, 1.0), &mut history), None);
        }
        assert_eq!(history.total_failed_servers, 0);
    }

    #[test]
    fn zero_coefficient_never_fires() {
        let mut chaos = ChaosInjector::from_seed(Some(11));
        let mut history = AdaptationState::new();
        for _ in 0..1_000 {
            assert_eq!(chaos.maybe_inject_failure(&snapshot(10, 0.0), &mut history), None);
        }
    }

    #[test]
    fn certain_coefficient_records_failure() {
        let mut chaos = ChaosInjector::from_seed(Some(3));
        let mut history = AdaptationState::new();

        let tactic = chaos.maybe_inject_failure(&snapshot(4, 1.0), &mut history);
        assert_eq!(tactic, Some(Tactic::RemoveServer));
        assert_eq!(history.total_failed_servers, 1);
        assert_eq!(history.time_at_last_failed_server, Some(360.0));
    }

    #[test]
    fn seeded_injectors_are_reproducible() {
        let run = |seed| {
            let mut chaos = ChaosInjector::from_seed(Some(seed));
            let mut history = AdaptationState::new();
            (0..200)
                .map(|_| chaos.maybe_inject_failure(&snapshot(5, 0.3), &mut history).is_some())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn firing_rate_tracks_coefficient() {
        let mut chaos = ChaosInjector::from_seed(Some(2024));
        let mut history = AdaptationState::new();
        let fired = (0..10_000)
            .filter(|_| chaos.maybe_inject_failure(&snapshot(5, 0.2), &mut history).is_some())
            .count();
        assert!((1_700..=2_300).contains(&fired), "fired {fired} times");
    }
}
