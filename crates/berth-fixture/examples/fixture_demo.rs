//! Walkthrough of a memcached fixture: start, resolve, probe, tear down.
//!
//! Requires a Docker-compatible engine on `PATH`.
//!
//! Run with:
//! ```bash
//! cargo run --example fixture_demo
//! ```

use std::time::Duration;

use berth_common::config::FixtureConfig;
use berth_fixture::Fixture;

fn main() -> berth_common::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let fixture = Fixture::new(FixtureConfig::default());
    if !fixture.available() {
        tracing::warn!("no container engine on PATH, nothing to demonstrate");
        return Ok(());
    }

    tracing::info!("starting memcached fixture");
    let service = fixture.setup_container("memcached", 11211, Duration::from_secs(2))?;
    tracing::info!(
        id = %service.handle.id(),
        endpoint = %service.endpoint,
        "memcached is reachable"
    );

    // A fixture's endpoint is recomputed on every lookup.
    let endpoint = service.handle.endpoint(11211)?;
    tracing::info!(%endpoint, "endpoint re-resolved");

    service.teardown()?;
    tracing::info!("fixture torn down");
    Ok(())
}
