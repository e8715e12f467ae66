//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// Copy of `cfg` with every plaintext API key masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for instance in cfg.instances.values_mut() {
        if instance.api_key.is_some() {
            instance.api_key = Some(REDACTED.into());
        }
    }
    cfg
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let toml_text = toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
                field: "config".into(),
                reason: format!("failed to serialize config: {e}"),
            })?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |_| toml_text.trim_end().to_owned(),
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetKey => {
            let cfg = config::load_config_or_default();
            let name = config::active_instance_name(global, &cfg);

            let key = match global.api_key {
                Some(ref key) => key.clone(),
                None => rpassword::prompt_password(format!("API key for '{name}': "))?,
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Validation {
                    field: "api_key".into(),
                    reason: "API key cannot be empty".into(),
                });
            }

            surge_config::store_api_key(&name, key)?;
            if !global.quiet {
                eprintln!("✓ API key for '{name}' stored in system keyring");
            }
            Ok(())
        }
    }
}
