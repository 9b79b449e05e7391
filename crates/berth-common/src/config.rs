//! Fixture configuration model.
//!
//! Everything that the original design kept in process-wide state (the
//! debug flag, the OS-keyed address resolution) lives here as explicit
//! values, threaded through constructors. Concurrent fixtures each carry
//! their own copy and never race on globals.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Strategy for resolving a container's reachable address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolverKind {
    /// Pick per host OS at construction time: `Direct` on Linux, where the
    /// engine runs containers in the local network namespace, `Gateway`
    /// everywhere else.
    #[default]
    Auto,
    /// The engine is remote or virtualized; containers are reached through
    /// the engine host's gateway address, read from a connection-URI
    /// environment variable.
    Gateway,
    /// The engine is local; the container's own assigned IP is reachable
    /// and is read via an inspect query.
    Direct,
}

/// Configuration for a container fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Engine binary to invoke, `docker` by default. Tests substitute a
    /// stub script here to exercise the lifecycle without a real engine.
    pub engine_binary: String,
    /// Machine-environment binary used by the environment provisioner.
    pub machine_binary: String,
    /// Machine name passed to the environment provisioner.
    pub machine_name: String,
    /// Suppress all remove operations, leaving containers behind for
    /// post-mortem inspection. Kill operations are unaffected.
    pub keep_containers: bool,
    /// Address resolution strategy.
    pub resolver: ResolverKind,
    /// Environment variable holding the engine connection URI
    /// (`scheme://host:port`), consulted by the gateway resolver.
    pub host_env_var: String,
    /// Sleep between reachability probe attempts.
    pub probe_interval: Duration,
    /// Upper bound on a single probe connect attempt.
    pub connect_timeout: Duration,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            engine_binary: "docker".into(),
            machine_binary: "docker-machine".into(),
            machine_name: "default".into(),
            keep_containers: false,
            resolver: ResolverKind::Auto,
            host_env_var: "DOCKER_HOST".into(),
            probe_interval: Duration::from_millis(100),
            connect_timeout: Duration::from_secs(1),
        }
    }
}
