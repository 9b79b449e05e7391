//! Subprocess adapter for the engine's command-line surface.

use std::process::Command;

use berth_common::config::FixtureConfig;
use berth_common::error::{BerthError, Result};
use berth_common::types::{ContainerId, ImageRef};

/// Captured output of a finished engine command.
#[derive(Debug)]
struct EngineOutput {
    stdout: String,
    stderr: String,
    success: bool,
}

impl EngineOutput {
    /// Combined stdout and stderr, trimmed, for error reporting.
    fn combined(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, _) => stderr.to_string(),
            (_, true) => stdout.to_string(),
            _ => format!("{stdout}\n{stderr}"),
        }
    }
}

/// Synchronous client for a Docker-compatible engine CLI.
///
/// Each operation blocks until the subprocess exits and normalizes the
/// exit status and captured output into a structured result. No command
/// is ever retried here; a failed invocation is reported immediately.
///
/// Cloning is cheap and clones share nothing but configuration, so a
/// handle can carry its own copy without coupling concurrent fixtures.
#[derive(Debug, Clone)]
pub struct EngineCli {
    config: FixtureConfig,
}

impl EngineCli {
    /// Creates a client from the given configuration.
    #[must_use]
    pub fn new(config: FixtureConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Returns whether the engine binary is present on `PATH`.
    ///
    /// A pre-flight check, not a lifecycle operation: suites use it to
    /// skip container-backed tests entirely when no engine is installed.
    #[must_use]
    pub fn available(&self) -> bool {
        which::which(&self.config.engine_binary).is_ok()
    }

    /// Pulls an image from the configured registry.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::PullFailed`] with the combined output on
    /// non-zero exit.
    pub fn pull(&self, image: &ImageRef) -> Result<()> {
        let out = self.invoke(&["pull", image.as_str()])?;
        if out.success {
            Ok(())
        } else {
            Err(BerthError::PullFailed {
                image: image.to_string(),
                output: out.combined(),
            })
        }
    }

    /// Starts a detached container with all exposed ports published to
    /// ephemeral host ports (`run -dP`).
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::RunFailed`] on non-zero exit, or
    /// [`BerthError::RunEmptyOutput`] when the engine exits zero without
    /// printing a container identifier.
    pub fn run(&self, image: &ImageRef) -> Result<ContainerId> {
        let name = fixture_name();
        self.run_with(image, &["-dP", "--name", name.as_str()])
    }

    /// Starts a container with caller-supplied run arguments, e.g.
    /// `["-d", "-p", ":11211"]`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::run`].
    pub fn run_with(&self, image: &ImageRef, args: &[&str]) -> Result<ContainerId> {
        let mut argv = vec!["run"];
        argv.extend_from_slice(args);
        argv.push(image.as_str());

        let out = self.invoke(&argv)?;
        if !out.success {
            return Err(BerthError::RunFailed {
                image: image.to_string(),
                output: out.combined(),
            });
        }

        // Pull progress may precede the identifier; the id is the last
        // non-empty stdout line.
        let id = out
            .stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| BerthError::RunEmptyOutput {
                image: image.to_string(),
            })?;

        tracing::info!(id, image = %image, "container started");
        Ok(ContainerId::new(id))
    }

    /// Kills a running container.
    ///
    /// Not idempotent: the engine errors when the container is already
    /// gone, and that error propagates.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::KillFailed`] on non-zero exit.
    pub fn kill(&self, id: &ContainerId) -> Result<()> {
        let out = self.invoke(&["kill", id.as_str()])?;
        if out.success {
            tracing::info!(id = %id, "container killed");
            Ok(())
        } else {
            Err(BerthError::KillFailed {
                id: id.to_string(),
                output: out.combined(),
            })
        }
    }

    /// Removes a container and its anonymous volumes (`rm -v`).
    ///
    /// When `keep_containers` is set this returns success without
    /// invoking the engine, leaving the container behind for post-mortem
    /// inspection.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::RemoveFailed`] on non-zero exit.
    pub fn remove(&self, id: &ContainerId) -> Result<()> {
        if self.config.keep_containers {
            tracing::debug!(id = %id, "keep_containers set, skipping remove");
            return Ok(());
        }
        let out = self.invoke(&["rm", "-v", id.as_str()])?;
        if out.success {
            tracing::info!(id = %id, "container removed");
            Ok(())
        } else {
            Err(BerthError::RemoveFailed {
                id: id.to_string(),
                output: out.combined(),
            })
        }
    }

    /// Removes a local image (`rmi`).
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::ImageRemoveFailed`] on non-zero exit, which
    /// is expected while a running container still references the image.
    pub fn remove_image(&self, image: &ImageRef) -> Result<()> {
        let out = self.invoke(&["rmi", image.as_str()])?;
        if out.success {
            tracing::info!(image = %image, "image removed");
            Ok(())
        } else {
            Err(BerthError::ImageRemoveFailed {
                image: image.to_string(),
                output: out.combined(),
            })
        }
    }

    /// Runs a structured query against container metadata
    /// (`inspect --format`), returning the trimmed output.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::InspectFailed`] on non-zero exit.
    pub fn inspect(&self, id: &ContainerId, format: &str) -> Result<String> {
        let out = self.invoke(&["inspect", "--format", format, id.as_str()])?;
        if out.success {
            Ok(out.stdout.trim().to_string())
        } else {
            Err(BerthError::InspectFailed {
                id: id.to_string(),
                output: out.combined(),
            })
        }
    }

    /// Lists local images as `repository:tag` entries
    /// (`images --no-trunc`).
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::ImageListFailed`] on non-zero exit.
    pub fn images(&self) -> Result<Vec<String>> {
        let out = self.invoke(&["images", "--no-trunc"])?;
        if !out.success {
            return Err(BerthError::ImageListFailed {
                output: out.combined(),
            });
        }

        let entries = out
            .stdout
            .lines()
            .skip(1) // column header
            .filter_map(|line| {
                let mut cols = line.split_whitespace();
                let repository = cols.next()?;
                let tag = cols.next()?;
                Some(format!("{repository}:{tag}"))
            })
            .collect();
        Ok(entries)
    }

    /// Invokes the engine binary with the given arguments, capturing
    /// stdout and stderr.
    fn invoke(&self, args: &[&str]) -> Result<EngineOutput> {
        let binary = &self.config.engine_binary;
        tracing::debug!(%binary, ?args, "invoking engine");

        let output = Command::new(binary)
            .args(args)
            .output()
            .map_err(|source| BerthError::Spawn {
                command: format!("{binary} {}", args.join(" ")),
                source,
            })?;

        Ok(EngineOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        })
    }
}

/// Generates a unique container name so parallel fixtures never collide.
fn fixture_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("berth-{}", &id[..12])
}
