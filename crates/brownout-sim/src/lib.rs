//! brownout-sim: a deliberately simple stand-in for the fleet.
//!
//! Plays the collaborators the policy engine expects around it: a
//! [`FleetModel`] that boots and removes servers and holds the dimmer, a
//! [`WorkloadModel`] that turns arrival rate and fleet size into
//! utilization and response time, and a [`Simulation`] that advances the
//! clock and calls the [`AdaptationManager`](brownout_policy::AdaptationManager)
//! once per evaluation period.
//!
//! # Cycle
//!
//! ```text
//! now += evaluation_period
//! fleet.advance_to(now)           // booted servers become active
//! sample = workload.sample(...)   // load observed over the elapsed period
//! batch  = manager.evaluate(snapshot)
//! for tactic in batch: fleet.execute(tactic)
//! ```

pub mod fleet;
pub mod simulation;
pub mod workload;

pub use fleet::FleetModel;
pub use simulation::{CycleReport, Simulation, SimulationReport, SimulationSummary};
pub use workload::{WorkloadModel, WorkloadSample};
