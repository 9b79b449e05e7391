//! Environment provisioning for remote engine hosts.
//!
//! When the engine runs inside a virtualized machine, its connection
//! settings (host URI, TLS paths) are published as shell `export` lines by
//! the machine tool. This module scrapes those lines and injects them into
//! the process environment so subsequent engine invocations pick them up.

use std::process::Command;

use berth_common::config::FixtureConfig;
use berth_common::error::{BerthError, Result};

/// Queries the machine tool for connection exports and injects each
/// `KEY="VALUE"` pair into the process environment.
///
/// Must be called before any concurrent fixture work begins: mutating the
/// process environment races with in-flight lifecycle operations.
///
/// # Errors
///
/// Returns [`BerthError::Spawn`] if the machine binary cannot be started
/// and [`BerthError::MachineEnvFailed`] on non-zero exit.
#[allow(unsafe_code)]
pub fn provision_env(config: &FixtureConfig) -> Result<Vec<(String, String)>> {
    let binary = &config.machine_binary;
    let machine = &config.machine_name;

    let output = Command::new(binary)
        .args(["env", machine])
        .output()
        .map_err(|source| BerthError::Spawn {
            command: format!("{binary} env {machine}"),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BerthError::MachineEnvFailed {
            machine: machine.clone(),
            output: stderr.trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let exports = parse_exports(&stdout);
    for (key, value) in &exports {
        tracing::debug!(key = %key, "exporting machine variable");
        // SAFETY: callers serialize provisioning before spawning any
        // threads, as documented above.
        unsafe { std::env::set_var(key, value) };
    }
    Ok(exports)
}

/// Parses `export KEY="VALUE"` lines, skipping anything else.
fn parse_exports(text: &str) -> Vec<(String, String)> {
    text.lines().filter_map(parse_export_line).collect()
}

fn parse_export_line(line: &str) -> Option<(String, String)> {
    let rest = line.trim().strip_prefix("export ")?;
    let (key, value) = rest.split_once('=')?;
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    let value = value.strip_prefix('"')?.strip_suffix('"')?;
    if value.contains('"') {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}
