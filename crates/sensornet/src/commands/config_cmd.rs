//! Config subcommand handlers.

use sensornet_config::{
    Profile, config_path, load_config, profile_to_dashboard_config, save_config,
};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::available_profiles;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = load_config()?;
            let out = output::render_single(global.output, &cfg, |c| {
                toml::to_string_pretty(c).unwrap_or_else(|e| format!("# unrenderable: {e}"))
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = load_config()?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            let out = cfg
                .profiles
                .iter()
                .map(|(name, p)| {
                    let marker = if name == default { "*" } else { " " };
                    format!("{marker} {name}\t{}", p.server)
                })
                .collect::<Vec<_>>()
                .join("\n");
            if out.is_empty() {
                output::note("No profiles configured. Run: sensornet config init", global.quiet);
            }
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init {
            server,
            name,
            force,
        } => {
            let mut cfg = load_config().unwrap_or_default();
            if cfg.profiles.contains_key(&name) && !force {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: format!(
                        "profile '{name}' already exists (existing: {}); pass --force to replace it",
                        available_profiles(&cfg)
                    ),
                });
            }

            let profile = Profile::new(server);
            // Reject URLs the engine could not use before writing anything.
            profile_to_dashboard_config(&profile, &cfg.defaults)?;

            if cfg.profiles.is_empty() {
                cfg.default_profile = Some(name.clone());
            }
            cfg.profiles.insert(name.clone(), profile);
            save_config(&cfg)?;

            output::note(
                &format!("Saved profile '{name}' to {}", config_path().display()),
                global.quiet,
            );
            Ok(())
        }
    }
}
