//! CLI configuration: thin wrapper around `surge_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --api-key, etc.).

use secrecy::SecretString;

use surge_core::ConnectionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use surge_config::{Config, Instance, config_path, load_config_or_default};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active instance name from CLI flags and config.
pub fn active_instance_name(global: &GlobalOpts, config: &Config) -> String {
    config.instance_name(global.instance.as_deref())
}

/// Build a `ConnectionConfig` from the config file, instance, and CLI
/// overrides. Flags beat the instance, which beats `[defaults]`.
pub fn build_connection_config(
    global: &GlobalOpts,
    poll_override: Option<u64>,
) -> Result<ConnectionConfig, CliError> {
    let cfg = load_config_or_default();
    let name = active_instance_name(global, &cfg);

    let mut instance = match cfg.instances.get(&name) {
        Some(instance) => instance.clone(),
        None if global.instance.is_some() => {
            let mut available: Vec<&str> = cfg.instances.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::InstanceNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => Instance::default(),
    };
    apply_overrides(&mut instance, global, poll_override);

    if instance.host.trim().is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }

    let config = match global.api_key {
        Some(ref key) => surge_config::build_connection_config(
            &instance,
            &name,
            &cfg.defaults,
            SecretString::from(key.clone()),
        )?,
        None => surge_config::instance_to_connection_config(&instance, &name, &cfg.defaults)?,
    };
    Ok(config)
}

fn apply_overrides(instance: &mut Instance, global: &GlobalOpts, poll_override: Option<u64>) {
    if let Some(ref host) = global.host {
        instance.host.clone_from(host);
    }
    if global.port.is_some() {
        instance.port = global.port;
    }
    if global.https {
        instance.https = true;
    }
    if global.insecure {
        instance.insecure = Some(true);
    }
    if global.timeout.is_some() {
        instance.timeout = global.timeout;
    }
    if poll_override.is_some() {
        instance.poll_interval = poll_override;
    }
}
