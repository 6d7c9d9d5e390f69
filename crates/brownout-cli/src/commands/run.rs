use std::path::Path;

use brownout_core::BrownoutConfig;
use brownout_sim::{Simulation, SimulationReport};
use tracing::info;

pub fn run(config_path: &Path, cycles: u64, seed: Option<u64>, format: &str) -> anyhow::Result<()> {
    let mut config = BrownoutConfig::from_file(config_path)?;
    if seed.is_some() {
        config.policy.chaos_seed = seed;
    }
    info!(config = %config_path.display(), cycles, seed = ?config.policy.chaos_seed, "loaded configuration");

    let mut simulation = Simulation::new(config)?;
    let report = simulation.run(cycles);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("{}", format_report(&report));
        }
    }

    Ok(())
}

fn format_report(report: &SimulationReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>6} {:>8} {:>7} {:>7} {:>8} {:>6}  tactics\n",
        "cycle", "time", "servers", "util", "rt", "dimmer"
    ));
    for cycle in &report.cycles {
        let snap = &cycle.snapshot;
        let servers = format!("{}/{}", snap.active_servers, snap.provisioned_servers);
        out.push_str(&format!(
            "{:>6} {:>8.0} {:>7} {:>7.2} {:>8.3} {:>6.2}  {}",
            cycle.cycle,
            snap.current_time,
            servers,
            snap.utilization,
            snap.avg_response_time,
            snap.dimmer_factor,
            cycle.batch,
        ));
        if cycle.rejected > 0 {
            out.push_str(&format!(" ({} rejected)", cycle.rejected));
        }
        out.push('\n');
    }

    let s = &report.summary;
    out.push_str(&format!("\n✓ {} cycles with the {} policy\n", s.cycles, s.policy));
    out.push_str(&format!(
        "  Servers:   +{} / -{} (final {} active, {} provisioned)\n",
        s.servers_added, s.servers_removed, s.final_active_servers, s.final_provisioned_servers
    ));
    out.push_str(&format!(
        "  Dimmer:    {} changes (final {:.2})\n",
        s.dimmer_changes, s.final_dimmer
    ));
    out.push_str(&format!(
        "  Response:  mean {:.3}s, {:.1}% of cycles over threshold\n",
        s.mean_response_time,
        s.overloaded_fraction * 100.0
    ));
    out.push_str(&format!(
        "  Chaos:     {} injected failures, {} standby servers\n",
        s.adaptation.total_failed_servers, s.adaptation.current_extra_servers
    ));
    out
}
