//! Shared types used across brownout crates.

use serde::{Deserialize, Serialize};

// ── Observation ───────────────────────────────────────────────────

/// Read-only view of the fleet and workload, rebuilt every control cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSnapshot {
    /// Servers that are booted and serving traffic.
    pub active_servers: u32,
    /// Servers provisioned so far, including those still booting.
    pub provisioned_servers: u32,
    pub max_servers: u32,
    /// Capacity, in server-equivalents, of the configured active fleet.
    pub configured_capacity_units: f64,
    /// Observed busy capacity, in server-equivalents.
    pub utilization: f64,
    /// Average response time over the last period (seconds).
    pub avg_response_time: f64,
    pub response_time_threshold: f64,
    /// Admission-control level: 1.0 serves full content, 0.0 sheds all optional content.
    pub dimmer_factor: f64,
    pub dimmer_level_count: u32,
    /// Per-cycle, per-server failure probability.
    pub chaos_coefficient: f64,
    pub boot_delay: f64,
    pub current_time: f64,
}

impl ObservationSnapshot {
    /// Idle headroom in server-equivalents.
    pub fn spare_utilization(&self) -> f64 {
        self.configured_capacity_units - self.utilization
    }

    /// True when a provisioned server has not finished booting yet.
    pub fn is_booting(&self) -> bool {
        self.provisioned_servers > self.active_servers
    }

    /// Size of one dimmer increment.
    pub fn dimmer_step(&self) -> f64 {
        1.0 / f64::from(self.dimmer_level_count.saturating_sub(1).max(1))
    }
}

// ── Tactics ───────────────────────────────────────────────────────

/// An atomic corrective action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tactic {
    AddServer,
    RemoveServer,
    SetDimmer { level: f64 },
}

impl Tactic {
    pub fn label(&self) -> &'static str {
        match self {
            Tactic::AddServer => "add_server",
            Tactic::RemoveServer => "remove_server",
            Tactic::SetDimmer { .. } => "set_dimmer",
        }
    }
}

impl std::fmt::Display for Tactic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tactic::SetDimmer { level } => write!(f, "set_dimmer({level:.2})"),
            other => f.write_str(other.label()),
        }
    }
}

/// Ordered set of tactics produced for one control cycle.
///
/// Execution order is insertion order. An empty batch is a no-op cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionBatch {
    tactics: Vec<Tactic>,
}

impl ActionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tactic: Tactic) {
        self.tactics.push(tactic);
    }

    pub fn len(&self) -> usize {
        self.tactics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tactics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tactic> {
        self.tactics.iter()
    }

    pub fn as_slice(&self) -> &[Tactic] {
        &self.tactics
    }

    /// Number of `AddServer` tactics queued so far.
    pub fn pending_additions(&self) -> u32 {
        self.count(|t| matches!(t, Tactic::AddServer))
    }

    /// Number of `RemoveServer` tactics queued so far.
    pub fn pending_removals(&self) -> u32 {
        self.count(|t| matches!(t, Tactic::RemoveServer))
    }

    fn count(&self, pred: impl Fn(&Tactic) -> bool) -> u32 {
        self.tactics.iter().filter(|t| pred(t)).count() as u32
    }
}

impl From<Vec<Tactic>> for ActionBatch {
    fn from(tactics: Vec<Tactic>) -> Self {
        Self { tactics }
    }
}

impl IntoIterator for ActionBatch {
    type Item = Tactic;
    type IntoIter = std::vec::IntoIter<Tactic>;

    fn into_iter(self) -> Self::IntoIter {
        self.tactics.into_iter()
    }
}

impl<'a> IntoIterator for &'a ActionBatch {
    type Item = &'a Tactic;
    type IntoIter = std::slice::Iter<'a, Tactic>;

    fn into_iter(self) -> Self::IntoIter {
        self.tactics.iter()
    }
}

impl std::fmt::Display for ActionBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, tactic) in self.tactics.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tactic}")?;
        }
        f.write_str("]")
    }
}
