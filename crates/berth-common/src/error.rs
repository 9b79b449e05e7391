//! Unified error types for the berth workspace.
//!
//! Every failure mode is recoverable from the caller's perspective: a test
//! suite reacts to these by failing or skipping a single fixture, never by
//! aborting the process. Each variant carries the resource it concerns
//! (image name, container identifier, port, address) so diagnostics always
//! say *what* was involved, not just that a subprocess exited non-zero.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum BerthError {
    /// The engine binary was not found on `PATH`.
    ///
    /// This is a precondition failure, not a lifecycle error: suites
    /// typically skip all container-backed tests when they see it.
    #[error("container engine '{binary}' not found on PATH")]
    EngineUnavailable {
        /// Name of the engine binary that was looked up.
        binary: String,
    },

    /// Launching an engine subprocess failed before it could run.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        /// The full command line that failed to start.
        command: String,
        /// Underlying I/O error from process creation.
        source: std::io::Error,
    },

    /// `pull` exited non-zero.
    #[error("pulling image '{image}' failed: {output}")]
    PullFailed {
        /// Image that could not be pulled.
        image: String,
        /// Combined stdout and stderr of the pull command.
        output: String,
    },

    /// `run` exited non-zero.
    #[error("running image '{image}' failed: {output}")]
    RunFailed {
        /// Image that could not be started.
        image: String,
        /// Combined stdout and stderr of the run command.
        output: String,
    },

    /// `run` exited zero but printed no container identifier.
    ///
    /// Some engines fail silently; an empty identifier is treated as its
    /// own failure mode rather than folded into [`Self::RunFailed`].
    #[error("engine returned empty output when running image '{image}'")]
    RunEmptyOutput {
        /// Image whose run produced no identifier.
        image: String,
    },

    /// `kill` exited non-zero.
    #[error("killing container {id} failed: {output}")]
    KillFailed {
        /// Container that could not be killed.
        id: String,
        /// Combined stdout and stderr of the kill command.
        output: String,
    },

    /// `rm` exited non-zero.
    #[error("removing container {id} failed: {output}")]
    RemoveFailed {
        /// Container that could not be removed.
        id: String,
        /// Combined stdout and stderr of the remove command.
        output: String,
    },

    /// `images` exited non-zero, so local image presence is unknown.
    #[error("listing local images failed: {output}")]
    ImageListFailed {
        /// Combined stdout and stderr of the images command.
        output: String,
    },

    /// `rmi` exited non-zero.
    ///
    /// Expected when a running container still references the image.
    #[error("removing image '{image}' failed: {output}")]
    ImageRemoveFailed {
        /// Image that could not be removed.
        image: String,
        /// Combined stdout and stderr of the rmi command.
        output: String,
    },

    /// `inspect` exited non-zero.
    #[error("inspecting container {id} failed: {output}")]
    InspectFailed {
        /// Container that could not be inspected.
        id: String,
        /// Combined stdout and stderr of the inspect command.
        output: String,
    },

    /// No host port is mapped to the requested container port.
    #[error("no host port mapped to container port {port}/tcp on {id}")]
    PortMappingNotFound {
        /// Container whose mapping was queried.
        id: String,
        /// The container-internal port with no published mapping.
        port: u16,
    },

    /// The machine-environment command exited non-zero.
    #[error("querying machine environment for '{machine}' failed: {output}")]
    MachineEnvFailed {
        /// Machine name that was queried.
        machine: String,
        /// Combined stdout and stderr of the env command.
        output: String,
    },

    /// A connection-URI environment variable was absent or malformed.
    #[error("environment variable {var} unparseable as scheme://host:port: {value:?}")]
    EnvUnparseable {
        /// Name of the variable that was read.
        var: String,
        /// The value found, empty if the variable was unset.
        value: String,
    },

    /// Inspect output did not contain a plausible IP address.
    #[error("no IP address found for container {id}: {raw:?}")]
    NoIpFound {
        /// Container whose address was queried.
        id: String,
        /// The raw inspect output that failed validation.
        raw: String,
    },

    /// The endpoint never accepted a TCP connection within the budget.
    #[error("{addr} unreachable for {waited:?}")]
    Unreachable {
        /// Address that was probed.
        addr: String,
        /// Total wall-clock time spent probing.
        waited: Duration,
    },

    /// Startup of a created container failed after the run step, so the
    /// underlying cause is paired with the container's identity.
    #[error("startup of container {id} failed: {source}")]
    StartupFailed {
        /// Container whose startup did not complete.
        id: String,
        /// The resolution or reachability failure that ended it.
        source: Box<BerthError>,
    },

    /// A primary failure followed by a failed best-effort cleanup.
    ///
    /// Both causes are preserved so the caller can decide which to act on.
    #[error("{primary} (cleanup also failed: {cleanup})")]
    CleanupFailed {
        /// The failure that triggered the teardown.
        primary: Box<BerthError>,
        /// The failure encountered during the teardown itself.
        cleanup: Box<BerthError>,
    },
}

impl BerthError {
    /// Wraps `self` with a cleanup failure that occurred while tearing
    /// down after it, preserving both causes.
    #[must_use]
    pub fn with_cleanup(self, cleanup: BerthError) -> Self {
        Self::CleanupFailed {
            primary: Box::new(self),
            cleanup: Box::new(cleanup),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BerthError>;
