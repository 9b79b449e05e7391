//! The container lifecycle state machine.
//!
//! Conceptual states for one fixture operation:
//! `Absent → Pulling → Created → Probing → Ready | Failed`. None of the
//! intermediate states are observable from outside; the caller sees only
//! the final handle or error. All engine calls block the current thread,
//! and a fixture holds no mutable state, so concurrency across containers
//! is simply a matter of calling into separate fixtures (or the same one)
//! from separate threads.

use std::sync::Arc;
use std::time::Duration;

use berth_common::config::FixtureConfig;
use berth_common::error::{BerthError, Result};
use berth_common::types::{ContainerId, Endpoint, ImageRef};
use berth_engine::{EngineCli, image};

use crate::handle::ContainerHandle;
use crate::probe;
use crate::resolver::{self, AddressResolver};

/// A container that passed its reachability check.
///
/// The endpoint was reachable at the time of the check; that is a
/// point-in-time statement, not a lease. Teardown belongs to the caller.
#[derive(Debug)]
pub struct RunningService {
    /// Handle to the verified container.
    pub handle: ContainerHandle,
    /// The endpoint that answered the probe.
    pub endpoint: Endpoint,
}

impl RunningService {
    /// Kills and removes the container, consuming the service.
    ///
    /// # Errors
    ///
    /// Propagates the first failing teardown step.
    pub fn teardown(self) -> Result<()> {
        self.handle.kill_remove()
    }
}

/// Lifecycle manager for ephemeral container fixtures.
#[derive(Debug)]
pub struct Fixture {
    engine: EngineCli,
    resolver: Arc<dyn AddressResolver>,
}

impl Fixture {
    /// Creates a fixture from configuration, selecting the address
    /// resolution strategy once, here.
    #[must_use]
    pub fn new(config: FixtureConfig) -> Self {
        let resolver = resolver::select(&config);
        Self {
            engine: EngineCli::new(config),
            resolver,
        }
    }

    /// Creates a fixture with an explicit resolver, bypassing selection.
    #[must_use]
    pub fn with_resolver(engine: EngineCli, resolver: Arc<dyn AddressResolver>) -> Self {
        Self { engine, resolver }
    }

    /// The underlying engine client.
    #[must_use]
    pub fn engine(&self) -> &EngineCli {
        &self.engine
    }

    /// Whether the configured engine binary is present on `PATH`.
    #[must_use]
    pub fn available(&self) -> bool {
        self.engine.available()
    }

    /// Binds an already-running container's identifier to this fixture's
    /// engine and resolver.
    #[must_use]
    pub fn handle(&self, id: ContainerId) -> ContainerHandle {
        ContainerHandle::new(id, self.engine.clone(), Arc::clone(&self.resolver))
    }

    /// Starts a detached container from `image`, pulling it first if it
    /// is not cached locally.
    ///
    /// No reachability check is performed; pair with
    /// [`ContainerHandle::endpoint`] and [`probe::await_reachable`], or
    /// use [`Self::setup_container`] for the full sequence. Run failure
    /// is terminal with nothing to clean up, since no container exists
    /// yet.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::EngineUnavailable`] when the engine binary
    /// is missing, or the pull/run failure otherwise.
    pub fn start_container(&self, image: &str) -> Result<ContainerHandle> {
        self.ensure_available()?;
        let image = ImageRef::new(image);
        image::check_image(&self.engine, &image)?;
        let id = self.engine.run(&image)?;
        Ok(self.handle(id))
    }

    /// Full fixture setup: pull if absent, start with all ports
    /// published, resolve the mapping for `container_port`, and probe the
    /// endpoint for up to `timeout`.
    ///
    /// # Errors
    ///
    /// Propagates pull/run failures directly; failures after creation are
    /// wrapped in [`BerthError::StartupFailed`] with the container
    /// identity, after a best-effort kill+remove (a failed cleanup is
    /// attached via [`BerthError::CleanupFailed`]).
    pub fn setup_container(
        &self,
        image: &str,
        container_port: u16,
        timeout: Duration,
    ) -> Result<RunningService> {
        let image_ref = ImageRef::new(image);
        self.setup_container_with(
            image,
            timeout,
            |fixture| {
                let id = fixture.engine.run(&image_ref)?;
                Ok(fixture.handle(id))
            },
            |handle| handle.get_port(container_port),
        )
    }

    /// [`Self::setup_container`] generalized over how the container is
    /// started and how its host port is found, for images that need
    /// custom run arguments.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::setup_container`].
    pub fn setup_container_with<S, P>(
        &self,
        image: &str,
        timeout: Duration,
        starter: S,
        port_selector: P,
    ) -> Result<RunningService>
    where
        S: FnOnce(&Self) -> Result<ContainerHandle>,
        P: FnOnce(&ContainerHandle) -> Result<u16>,
    {
        self.ensure_available()?;
        let image = ImageRef::new(image);

        // Absent → Pulling → Created.
        image::check_image(&self.engine, &image)?;
        let handle = starter(self)?;
        tracing::info!(id = %handle.id(), image = %image, "container created, probing");

        // Created → Probing → Ready | Failed.
        match self.validate(&handle, port_selector, timeout) {
            Ok(endpoint) => {
                tracing::info!(id = %handle.id(), %endpoint, "container ready");
                Ok(RunningService { handle, endpoint })
            }
            Err(cause) => {
                let primary = BerthError::StartupFailed {
                    id: handle.id().to_string(),
                    source: Box::new(cause),
                };
                tracing::warn!(id = %handle.id(), error = %primary, "startup failed, tearing down");
                match handle.kill_remove() {
                    Ok(()) => Err(primary),
                    Err(cleanup) => Err(primary.with_cleanup(cleanup)),
                }
            }
        }
    }

    /// Resolves the endpoint and probes it within the timeout budget.
    fn validate<P>(
        &self,
        handle: &ContainerHandle,
        port_selector: P,
        timeout: Duration,
    ) -> Result<Endpoint>
    where
        P: FnOnce(&ContainerHandle) -> Result<u16>,
    {
        let address = handle.ip()?;
        let port = port_selector(handle)?;
        let endpoint = Endpoint { address, port };
        let config = self.engine.config();
        probe::await_reachable(
            &endpoint.to_string(),
            timeout,
            config.probe_interval,
            config.connect_timeout,
        )?;
        Ok(endpoint)
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available() {
            Ok(())
        } else {
            Err(BerthError::EngineUnavailable {
                binary: self.engine.config().engine_binary.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_engine_is_a_precondition_failure() {
        let config = FixtureConfig {
            engine_binary: "berth-no-such-engine".into(),
            ..FixtureConfig::default()
        };
        let fixture = Fixture::new(config);
        assert!(!fixture.available());
        let err = fixture.start_container("memcached").unwrap_err();
        assert!(matches!(err, BerthError::EngineUnavailable { .. }));
    }
}
