//! brownout-policy: the per-cycle adaptation decision engine.
//!
//! Each control cycle the [`AdaptationManager`] receives an
//! [`ObservationSnapshot`](brownout_core::ObservationSnapshot) and returns an
//! ordered [`ActionBatch`](brownout_core::ActionBatch) of tactics for the
//! executor to apply.
//!
//! # Decision Pipeline
//!
//! ```text
//! chaos draw  ── fires? ──> [RemoveServer]            (short-circuit)
//!      │
//!      v
//! risk = estimate(snapshot, history)                   (risk-aware only)
//! if risk > 0:
//!     target = ceil(active * band_fraction(risk))
//!     reconcile extra servers toward target            (Add/Remove xN)
//!      │
//!      v
//! dimmer hysteresis:
//!     rt > threshold or risk > spare  -> add server, else dim
//!     rt < threshold and risk <= spare and spare > 1
//!                                     -> undim, else remove server
//! ```
//!
//! Persistent counters live in [`AdaptationState`], owned by the manager.

pub mod capacity;
pub mod chaos;
pub mod dimmer;
pub mod level;
pub mod manager;
pub mod policy;
pub mod risk;
pub mod state;

pub use capacity::CapacityAdjuster;
pub use chaos::ChaosInjector;
pub use dimmer::DimmerController;
pub use level::AdaptationLevelCalculator;
pub use manager::AdaptationManager;
pub use policy::{Policy, ReactivePolicy, RiskAwarePolicy};
pub use risk::RiskEstimator;
pub use state::AdaptationState;
