//! Interfaces to the collaborators that surround the policy engine.
//!
//! The engine never measures the fleet or touches servers itself: an
//! [`ObservationSource`] hands it a snapshot each cycle and a
//! [`TacticExecutor`] applies the tactics it returns.

use crate::types::{ObservationSnapshot, Tactic};

/// Produces the snapshot the policy evaluates.
pub trait ObservationSource {
    fn observe(&self) -> ObservationSnapshot;
}

/// Applies tactics to the fleet.
pub trait TacticExecutor {
    /// Apply one tactic. Returns `false` if the executor refused it.
    fn execute(&mut self, tactic: &Tactic) -> bool;
}
