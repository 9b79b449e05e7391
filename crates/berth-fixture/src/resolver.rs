//! Address resolution strategies for running containers.
//!
//! Whether a container's own IP is reachable from the test host depends on
//! where the engine runs: a local engine puts containers in a directly
//! routable network namespace, while a virtualized or remote engine hides
//! them behind the engine host's gateway address. The strategy is chosen
//! once, from configuration, when the fixture is constructed.

use std::sync::Arc;

use berth_common::config::{FixtureConfig, ResolverKind};
use berth_common::error::{BerthError, Result};
use berth_common::types::ContainerId;
use berth_engine::EngineCli;

/// Inspect query for a container's own assigned IP.
const IP_FORMAT: &str = "{{ .NetworkSettings.IPAddress }}";

/// Shortest well-formed IPv4 literal, `0.0.0.0`. Anything shorter coming
/// out of an inspect query cannot be an address.
const MIN_IPV4_LEN: usize = 7;

/// Strategy for deriving the host-reachable address of a container.
pub trait AddressResolver: Send + Sync + std::fmt::Debug {
    /// Returns the address at which the container's published ports can
    /// be reached from the test host.
    ///
    /// # Errors
    ///
    /// Returns a resolution error specific to the strategy.
    fn address(&self, engine: &EngineCli, id: &ContainerId) -> Result<String>;
}

/// Resolves the gateway address of a remote or virtualized engine host by
/// reading a connection-URI environment variable (`scheme://host:port`).
#[derive(Debug)]
pub struct GatewayResolver {
    env_var: String,
}

impl GatewayResolver {
    /// Creates a resolver reading the given environment variable.
    #[must_use]
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
        }
    }
}

impl AddressResolver for GatewayResolver {
    fn address(&self, _engine: &EngineCli, _id: &ContainerId) -> Result<String> {
        let value = std::env::var(&self.env_var).unwrap_or_default();
        host_of_uri(&value).map(str::to_string).ok_or_else(|| {
            BerthError::EnvUnparseable {
                var: self.env_var.clone(),
                value,
            }
        })
    }
}

/// Resolves a local container's own assigned IP via an inspect query.
#[derive(Debug)]
pub struct DirectInspectResolver;

impl AddressResolver for DirectInspectResolver {
    fn address(&self, engine: &EngineCli, id: &ContainerId) -> Result<String> {
        let ip = engine.inspect(id, IP_FORMAT)?;
        if ip.len() < MIN_IPV4_LEN {
            return Err(BerthError::NoIpFound {
                id: id.to_string(),
                raw: ip,
            });
        }
        Ok(ip)
    }
}

/// Selects the resolver named by the configuration.
///
/// `Auto` picks [`DirectInspectResolver`] on Linux hosts, where the engine
/// shares the local network namespace, and [`GatewayResolver`] everywhere
/// else. The choice is made here, once, never per call.
#[must_use]
pub fn select(config: &FixtureConfig) -> Arc<dyn AddressResolver> {
    match config.resolver {
        ResolverKind::Gateway => Arc::new(GatewayResolver::new(config.host_env_var.clone())),
        ResolverKind::Direct => Arc::new(DirectInspectResolver),
        ResolverKind::Auto => {
            if std::env::consts::OS == "linux" {
                Arc::new(DirectInspectResolver)
            } else {
                Arc::new(GatewayResolver::new(config.host_env_var.clone()))
            }
        }
    }
}

/// Looks up the host port published for a container-internal TCP port.
///
/// # Errors
///
/// Returns [`BerthError::PortMappingNotFound`] when the port has no
/// published mapping (the engine's inspect template errors out, or
/// yields nothing usable).
pub fn host_port(engine: &EngineCli, id: &ContainerId, container_port: u16) -> Result<u16> {
    let format = format!(
        "{{{{ (index (index .NetworkSettings.Ports \"{container_port}/tcp\") 0).HostPort }}}}"
    );
    let not_found = || BerthError::PortMappingNotFound {
        id: id.to_string(),
        port: container_port,
    };
    match engine.inspect(id, &format) {
        Ok(out) => out.parse().map_err(|_| not_found()),
        Err(BerthError::InspectFailed { .. }) => Err(not_found()),
        Err(err) => Err(err),
    }
}

/// Extracts the host component of a `scheme://host:port` URI.
fn host_of_uri(value: &str) -> Option<&str> {
    let (scheme, rest) = value.split_once("://")?;
    if scheme.is_empty() {
        return None;
    }
    let (host, port) = rest.rsplit_once(':')?;
    if host.is_empty() || port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(host)
}
