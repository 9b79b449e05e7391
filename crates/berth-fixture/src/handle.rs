//! Caller-owned handle to a single started container.

use std::sync::Arc;

use berth_common::error::Result;
use berth_common::types::{ContainerId, Endpoint};
use berth_engine::EngineCli;

use crate::resolver::{self, AddressResolver};

/// A started container, bound to the engine client and resolver that
/// created it.
///
/// The fixture hands ownership to the caller on successful startup; from
/// then on teardown is the caller's job. The handle shares nothing
/// mutable with its fixture, so handles on different containers can be
/// used from different threads freely.
#[derive(Debug)]
pub struct ContainerHandle {
    id: ContainerId,
    engine: EngineCli,
    resolver: Arc<dyn AddressResolver>,
}

impl ContainerHandle {
    pub(crate) fn new(
        id: ContainerId,
        engine: EngineCli,
        resolver: Arc<dyn AddressResolver>,
    ) -> Self {
        Self {
            id,
            engine,
            resolver,
        }
    }

    /// The engine-assigned container identifier.
    #[must_use]
    pub fn id(&self) -> &ContainerId {
        &self.id
    }

    /// Resolves the host-reachable address of this container.
    ///
    /// Recomputed on every call — mapped addresses may only stabilize
    /// after start, so nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns the configured resolver's failure mode
    /// ([`EnvUnparseable`](berth_common::error::BerthError::EnvUnparseable)
    /// or [`NoIpFound`](berth_common::error::BerthError::NoIpFound)).
    pub fn ip(&self) -> Result<String> {
        self.resolver.address(&self.engine, &self.id)
    }

    /// Looks up the host port published for a container-internal TCP
    /// port.
    ///
    /// # Errors
    ///
    /// Returns [`PortMappingNotFound`](berth_common::error::BerthError::PortMappingNotFound)
    /// when the port was never published.
    pub fn get_port(&self, container_port: u16) -> Result<u16> {
        resolver::host_port(&self.engine, &self.id, container_port)
    }

    /// Resolves the full reachable endpoint for a container-internal
    /// port: address from the resolver, port from the engine's mapping.
    ///
    /// # Errors
    ///
    /// Propagates either lookup's failure.
    pub fn endpoint(&self, container_port: u16) -> Result<Endpoint> {
        let address = self.ip()?;
        let port = self.get_port(container_port)?;
        Ok(Endpoint { address, port })
    }

    /// Kills the container.
    ///
    /// # Errors
    ///
    /// Returns [`KillFailed`](berth_common::error::BerthError::KillFailed);
    /// killing an already-gone container is an error.
    pub fn kill(&self) -> Result<()> {
        self.engine.kill(&self.id)
    }

    /// Removes the container and its anonymous volumes. A no-op when the
    /// fixture was configured with `keep_containers`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoveFailed`](berth_common::error::BerthError::RemoveFailed).
    pub fn remove(&self) -> Result<()> {
        self.engine.remove(&self.id)
    }

    /// Kills the container, then removes it.
    ///
    /// Deliberately not idempotent: a second call fails on the kill step
    /// because the container is already gone, which lets test suites
    /// catch double-teardown bugs.
    ///
    /// # Errors
    ///
    /// Propagates the first failing step.
    pub fn kill_remove(&self) -> Result<()> {
        self.kill()?;
        self.remove()
    }
}
