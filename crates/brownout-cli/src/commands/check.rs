use std::path::Path;

use brownout_core::BrownoutConfig;

pub fn check(config_path: &Path) -> anyhow::Result<()> {
    let config = BrownoutConfig::from_file(config_path)?;
    let step = 1.0 / f64::from(config.fleet.dimmer_levels - 1);

    println!("✓ {} is valid", config_path.display());
    println!(
        "  Policy: {:?} (risk model {:?}), threshold {}s",
        config.policy.kind, config.policy.risk_model, config.policy.response_time_threshold
    );
    println!(
        "  Fleet:  {}..={} servers, boot delay {}s, dimmer step {:.3}",
        config.fleet.initial_servers, config.fleet.max_servers, config.fleet.boot_delay, step
    );
    println!();
    print!("{}", config.to_toml_string()?);
    Ok(())
}
