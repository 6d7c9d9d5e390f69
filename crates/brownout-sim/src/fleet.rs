//! Server lifecycle and the dimmer.
//!
//! Servers are provisioned with a boot delay and only count as active once
//! the clock passes their ready time. Removal cancels the most recently
//! provisioned booting server first, then takes an active one.

use tracing::{debug, warn};

use brownout_core::config::FleetConfig;
use brownout_core::{Tactic, TacticExecutor};

#[derive(Debug, Clone)]
pub struct FleetModel {
    max_servers: u32,
    active: u32,
    /// Ready times of servers still booting, oldest first.
    booting: Vec<f64>,
    dimmer: f64,
    boot_delay: f64,
    now: f64,
}

impl FleetModel {
    /// Fleet with `initial_servers` already active at time zero.
    pub fn new(config: &FleetConfig) -> Self {
        Self {
            max_servers: config.max_servers,
            active: config.initial_servers.min(config.max_servers),
            booting: Vec::new(),
            dimmer: config.initial_dimmer.clamp(0.0, 1.0),
            boot_delay: config.boot_delay,
            now: 0.0,
        }
    }

    /// Move the clock forward and activate every server whose boot finished.
    ///
    /// Returns the number of servers that became active.
    pub fn advance_to(&mut self, now: f64) -> u32 {
        self.now = self.now.max(now);
        let before = self.booting.len();
        let clock = self.now;
        self.booting.retain(|ready_at| *ready_at > clock);
        let activated = (before - self.booting.len()) as u32;
        if activated > 0 {
            self.active += activated;
            debug!(activated, active = self.active, now = self.now, "servers finished booting");
        }
        activated
    }

    pub fn active_servers(&self) -> u32 {
        self.active
    }

    /// Active plus booting servers.
    pub fn provisioned_servers(&self) -> u32 {
        self.active + self.booting.len() as u32
    }

    pub fn max_servers(&self) -> u32 {
        self.max_servers
    }

    pub fn dimmer(&self) -> f64 {
        self.dimmer
    }

    pub fn boot_delay(&self) -> f64 {
        self.boot_delay
    }

    pub fn now(&self) -> f64 {
        self.now
    }
}

impl TacticExecutor for FleetModel {
    fn execute(&mut self, tactic: &Tactic) -> bool {
        match *tactic {
            Tactic::AddServer => {
                if self.provisioned_servers() >= self.max_servers {
                    warn!(max = self.max_servers, "add_server refused: fleet at capacity");
                    return false;
                }
                self.booting.push(self.now + self.boot_delay);
                debug!(ready_at = self.now + self.boot_delay, "server provisioned");
                true
            }
            Tactic::RemoveServer => {
                if self.booting.pop().is_some() {
                    debug!("booting server cancelled");
                    true
                } else if self.active > 1 {
                    self.active -= 1;
                    debug!(active = self.active, "server removed");
                    true
                } else {
                    warn!("remove_server refused: last active server");
                    false
                }
            }
            Tactic::SetDimmer { level } => {
                self.dimmer = level.clamp(0.0, 1.0);
                debug!(dimmer = self.dimmer, "dimmer set");
                true
            }
        }
    }
}
