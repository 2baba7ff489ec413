//! Profile resolution with CLI flag overrides.
//!
//! The single boundary where CLI flags, the config file, and core's
//! `DashboardConfig` meet.

use sensornet_config::{Config, Profile, config_path, load_config, profile_to_dashboard_config};
use sensornet_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `DashboardConfig` from the config file, profile, and CLI flags.
///
/// Without a matching profile, `--server` alone is enough.
pub fn build_dashboard_config(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let cfg = load_config()?;
    let name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() && global.server.is_none() => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(&cfg),
            });
        }
        None => {
            let server = global.server.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            Profile::new(server)
        }
    };

    if let Some(ref server) = global.server {
        if *server != profile.server {
            profile.server.clone_from(server);
            profile.push_url = None;
        }
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    tracing::debug!(profile = %name, server = %profile.server, "resolved profile");
    Ok(profile_to_dashboard_config(&profile, &cfg.defaults)?)
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
