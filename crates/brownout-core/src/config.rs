//! brownout.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrownoutConfig {
    pub policy: PolicyConfig,
    pub fleet: FleetConfig,
    pub workload: WorkloadConfig,
}

/// Which decision procedure runs each cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Response-time hysteresis only.
    Reactive,
    /// Response time plus failure risk and standby capacity.
    #[default]
    RiskAware,
}

/// How failure risk is estimated by the risk-aware policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskModel {
    /// Probability that at least one active server fails this cycle.
    #[default]
    Binomial,
    /// Steady-state unavailability from observed MTBF and boot-time MTTR.
    EmpiricalMtbf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub kind: PolicyKind,
    pub risk_model: RiskModel,
    /// Response time (seconds) above which the fleet counts as overloaded.
    pub response_time_threshold: f64,
    pub chaos_enabled: bool,
    /// Seed for the chaos injector. Unset draws from the OS.
    pub chaos_seed: Option<u64>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            kind: PolicyKind::default(),
            risk_model: RiskModel::default(),
            response_time_threshold: 0.75,
            chaos_enabled: true,
            chaos_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub max_servers: u32,
    pub initial_servers: u32,
    /// Seconds between provisioning a server and it becoming active.
    pub boot_delay: f64,
    pub dimmer_levels: u32,
    pub initial_dimmer: f64,
    pub chaos_coefficient: f64,
    /// Seconds between control cycles.
    pub evaluation_period: f64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            max_servers: 3,
            initial_servers: 1,
            boot_delay: 120.0,
            dimmer_levels: 5,
            initial_dimmer: 1.0,
            chaos_coefficient: 0.0,
            evaluation_period: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Requests per second when no trace is given.
    pub arrival_rate: f64,
    /// Per-cycle arrival rates, replayed cyclically.
    pub arrival_trace: Option<Vec<f64>>,
    /// Mean service time (seconds) of a full-content response.
    pub service_time: f64,
    /// Mean service time (seconds) of a dimmed response.
    pub optional_service_time: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            arrival_rate: 10.0,
            arrival_trace: None,
            service_time: 0.06,
            optional_service_time: 0.02,
        }
    }
}

impl WorkloadConfig {
    /// Arrival rate for the given zero-based cycle.
    pub fn arrival_rate_at(&self, cycle: u64) -> f64 {
        match &self.arrival_trace {
            Some(trace) if !trace.is_empty() => trace[(cycle % trace.len() as u64) as usize],
            _ => self.arrival_rate,
        }
    }
}

impl BrownoutConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: BrownoutConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configurations the policy engine cannot run against.
    pub fn validate(&self) -> ConfigResult<()> {
        let fleet = &self.fleet;
        if fleet.max_servers < 1 {
            return Err(ConfigError::invalid("fleet.max_servers", "must be at least 1"));
        }
        if fleet.initial_servers < 1 || fleet.initial_servers > fleet.max_servers {
            return Err(ConfigError::invalid(
                "fleet.initial_servers",
                format!("must be within 1..={}", fleet.max_servers),
            ));
        }
        if fleet.dimmer_levels < 2 {
            return Err(ConfigError::invalid("fleet.dimmer_levels", "must be at least 2"));
        }
        if !(0.0..=1.0).contains(&fleet.initial_dimmer) {
            return Err(ConfigError::invalid("fleet.initial_dimmer", "must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&fleet.chaos_coefficient) {
            return Err(ConfigError::invalid(
                "fleet.chaos_coefficient",
                "must be a probability within [0, 1]",
            ));
        }
        if fleet.boot_delay.is_nan() || fleet.boot_delay < 0.0 {
            return Err(ConfigError::invalid("fleet.boot_delay", "must not be negative"));
        }
        if fleet.evaluation_period.is_nan() || fleet.evaluation_period <= 0.0 {
            return Err(ConfigError::invalid("fleet.evaluation_period", "must be positive"));
        }
        if !is_positive(self.policy.response_time_threshold) {
            return Err(ConfigError::invalid(
                "policy.response_time_threshold",
                "must be positive",
            ));
        }

        let workload = &self.workload;
        if workload.arrival_rate.is_nan() || workload.arrival_rate < 0.0 {
            return Err(ConfigError::invalid("workload.arrival_rate", "must not be negative"));
        }
        if let Some(trace) = &workload.arrival_trace
            && trace.iter().any(|r| r.is_nan() || *r < 0.0)
        {
            return Err(ConfigError::invalid(
                "workload.arrival_trace",
                "rates must not be negative",
            ));
        }
        if !is_positive(workload.service_time) || !is_positive(workload.optional_service_time) {
            return Err(ConfigError::invalid("workload.service_time", "must be positive"));
        }
        Ok(())
    }

    /// Scaffold a brownout.toml with every field spelled out.
    pub fn scaffold() -> Self {
        BrownoutConfig {
            policy: PolicyConfig {
                chaos_seed: Some(42),
                ..PolicyConfig::default()
            },
            fleet: FleetConfig {
                chaos_coefficient: 0.01,
                ..FleetConfig::default()
            },
            workload: WorkloadConfig {
                arrival_trace: Some(vec![10.0, 20.0, 40.0, 60.0, 40.0, 20.0]),
                ..WorkloadConfig::default()
            },
        }
    }
}

/// False for zero, negatives and NaN.
fn is_positive(value: f64) -> bool {
    value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_scaffold_roundtrips_through_toml() {
        let config = BrownoutConfig::scaffold();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("risk_aware"));
        assert!(toml_str.contains("binomial"));
        let back = BrownoutConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_parse_minimal() {
        let toml_str = r#"
[policy]
kind = "reactive"

[fleet]
max_servers = 20
initial_servers = 10
"#;
        let config = BrownoutConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.policy.kind, PolicyKind::Reactive);
        assert_eq!(config.policy.risk_model, RiskModel::Binomial);
        assert_eq!(config.fleet.max_servers, 20);
        assert_eq!(config.fleet.dimmer_levels, 5);
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = BrownoutConfig::from_toml_str("").unwrap();
        assert_eq!(config, BrownoutConfig::default());
    }

    #[test]
    fn test_rejects_single_dimmer_level() {
        let err = BrownoutConfig::from_toml_str("[fleet]\ndimmer_levels = 1\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "fleet.dimmer_levels", .. }
        ));
    }

    #[test]
    fn test_rejects_zero_max_servers() {
        let err = BrownoutConfig::from_toml_str("[fleet]\nmax_servers = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "fleet.max_servers", .. }));
    }

    #[test]
    fn test_rejects_initial_servers_above_max() {
        let err = BrownoutConfig::from_toml_str("[fleet]\nmax_servers = 2\ninitial_servers = 3\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "fleet.initial_servers", .. }
        ));
    }

    #[test]
    fn test_rejects_chaos_coefficient_out_of_range() {
        let err = BrownoutConfig::from_toml_str("[fleet]\nchaos_coefficient = 5.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "fleet.chaos_coefficient", .. }
        ));
    }

    #[test]
    fn test_rejects_nan_values() {
        let err = BrownoutConfig::from_toml_str("[fleet]\nboot_delay = nan\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "fleet.boot_delay", .. }));

        let err = BrownoutConfig::from_toml_str("[workload]\narrival_trace = [1.0, nan]\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "workload.arrival_trace", .. }
        ));

        let err = BrownoutConfig::from_toml_str("[policy]\nresponse_time_threshold = nan\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "policy.response_time_threshold", .. }
        ));
    }

    #[test]
    fn test_rejects_unknown_policy_kind() {
        let err = BrownoutConfig::from_toml_str("[policy]\nkind = \"predictive\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_arrival_trace_cycles() {
        let workload = WorkloadConfig {
            arrival_trace: Some(vec![1.0, 2.0, 3.0]),
            ..WorkloadConfig::default()
        };
        assert_eq!(workload.arrival_rate_at(0), 1.0);
        assert_eq!(workload.arrival_rate_at(4), 2.0);

        let constant = WorkloadConfig::default();
        assert_eq!(constant.arrival_rate_at(7), 10.0);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[policy]\nrisk_model = \"empirical_mtbf\"").unwrap();
        let config = BrownoutConfig::from_file(file.path()).unwrap();
        assert_eq!(config.policy.risk_model, RiskModel::EmpiricalMtbf);
    }

    #[test]
    fn test_from_missing_file() {
        let err = BrownoutConfig::from_file(Path::new("/nonexistent/brownout.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
