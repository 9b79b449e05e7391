//! # berth-fixture
//!
//! Ephemeral containerized service fixtures for automated tests.
//!
//! The [`Fixture`] lifecycle manager takes an image name to a running,
//! verified-reachable container: pull if absent, start detached with
//! published ports, resolve the host-reachable address, and poll the TCP
//! endpoint until it answers or the budget runs out. On any failure after
//! creation the container is killed and removed before the error is
//! surfaced; on success the caller receives a [`ContainerHandle`] and owns
//! its teardown.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use berth_common::config::FixtureConfig;
//! use berth_fixture::Fixture;
//!
//! # fn main() -> berth_common::error::Result<()> {
//! let fixture = Fixture::new(FixtureConfig::default());
//! let service = fixture.setup_container("memcached", 11211, Duration::from_secs(2))?;
//! // ... connect to service.endpoint ...
//! service.handle.kill_remove()?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod handle;
pub mod lifecycle;
pub mod probe;
pub mod resolver;

pub use handle::ContainerHandle;
pub use lifecycle::{Fixture, RunningService};
pub use resolver::{AddressResolver, DirectInspectResolver, GatewayResolver};
