//! End-to-end tests against a real container engine.
//!
//! These run only when an engine binary is on `PATH`; otherwise each
//! test returns early, which keeps the suite green on hosts without an
//! engine installed (the spec's "skip, don't fail" precondition).

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::print_stderr)]

use std::time::Duration;

use berth_common::config::FixtureConfig;
use berth_common::error::BerthError;
use berth_common::types::ImageRef;
use berth_fixture::Fixture;

const MEMCACHED: &str = "memcached";
const MEMCACHED_PORT: u16 = 11211;
const PROBE_BUDGET: Duration = Duration::from_secs(2);

fn skip_if_no_engine() -> Option<Fixture> {
    let fixture = Fixture::new(FixtureConfig::default());
    if fixture.available() {
        Some(fixture)
    } else {
        eprintln!("skipping: no container engine on PATH");
        None
    }
}

/// True once the container no longer exists as far as the engine knows.
fn is_gone(fixture: &Fixture, id: &berth_common::types::ContainerId) -> bool {
    fixture
        .engine()
        .inspect(id, "{{ .State.Running }}")
        .is_err()
}

#[test]
fn memcached_end_to_end() {
    let Some(fixture) = skip_if_no_engine() else {
        return;
    };

    let service = fixture
        .setup_container(MEMCACHED, MEMCACHED_PORT, PROBE_BUDGET)
        .expect("memcached fixture should come up");
    assert!(!service.handle.id().as_str().is_empty());

    let id = service.handle.id().clone();
    service.teardown().expect("teardown");
    assert!(is_gone(&fixture, &id), "container must be gone after teardown");
}

#[test]
fn double_teardown_is_detected() {
    let Some(fixture) = skip_if_no_engine() else {
        return;
    };

    let service = fixture
        .setup_container(MEMCACHED, MEMCACHED_PORT, PROBE_BUDGET)
        .expect("memcached fixture should come up");
    service.handle.kill_remove().expect("first teardown");
    let err = service.handle.kill_remove().unwrap_err();
    assert!(matches!(err, BerthError::KillFailed { .. }));
}

#[test]
fn image_referenced_by_running_container_cannot_be_removed() {
    let Some(fixture) = skip_if_no_engine() else {
        return;
    };

    let service = fixture
        .setup_container(MEMCACHED, MEMCACHED_PORT, PROBE_BUDGET)
        .expect("memcached fixture should come up");

    let err = fixture
        .engine()
        .remove_image(&ImageRef::new(MEMCACHED))
        .expect_err("image is in use");
    assert!(matches!(err, BerthError::ImageRemoveFailed { .. }));

    service.teardown().expect("teardown");
}

#[test]
fn nonexistent_image_leaves_nothing_behind() {
    let Some(fixture) = skip_if_no_engine() else {
        return;
    };

    let err = fixture
        .start_container("berth-test/definitely-no-such-image")
        .expect_err("image cannot be pulled");
    assert!(matches!(err, BerthError::PullFailed { .. }));
}
