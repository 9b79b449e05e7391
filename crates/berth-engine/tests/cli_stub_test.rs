//! Adapter tests against a stub engine script.
//!
//! A tiny shell script stands in for the engine binary: it logs every
//! invocation and answers each subcommand with canned output, so the
//! adapter's exit-status handling and argument shape can be verified
//! without a container engine installed.

#![cfg(unix)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::os::unix::fs::PermissionsExt;

use berth_common::config::FixtureConfig;
use berth_common::error::BerthError;
use berth_common::types::{ContainerId, ImageRef};
use berth_engine::{EngineCli, image};
use tempfile::TempDir;

struct StubEngine {
    dir: TempDir,
}

impl StubEngine {
    /// Writes an executable stub script whose body sees `$LOG` (the
    /// invocation log) and `$STATE` (a scratch directory).
    fn new(body: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("engine");
        let script = format!(
            "#!/bin/sh\nLOG=\"{log}\"\nSTATE=\"{state}\"\necho \"$@\" >> \"$LOG\"\n{body}\n",
            log = dir.path().join("invocations.log").display(),
            state = dir.path().display(),
        );
        fs::write(&path, script).expect("write stub");
        let mut perms = fs::metadata(&path).expect("stat stub").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod stub");
        Self { dir }
    }

    fn config(&self) -> FixtureConfig {
        FixtureConfig {
            engine_binary: self.dir.path().join("engine").display().to_string(),
            ..FixtureConfig::default()
        }
    }

    fn cli(&self) -> EngineCli {
        EngineCli::new(self.config())
    }

    fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("invocations.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

const CACHED_MEMCACHED: &str = r#"case "$1" in
  images) printf 'REPOSITORY TAG IMAGE ID CREATED SIZE\nmemcached latest sha256:aa 2d 80MB\nredis-stack latest sha256:bb 2d 300MB\n' ;;
esac
exit 0"#;

#[test]
fn check_image_skips_pull_when_cached() {
    let stub = StubEngine::new(CACHED_MEMCACHED);
    let cli = stub.cli();
    image::check_image(&cli, &ImageRef::new("memcached")).expect("cached image");

    let log = stub.invocations();
    assert_eq!(log, vec!["images --no-trunc"]);
}

#[test]
fn check_image_pulls_exactly_once_on_miss() {
    let stub = StubEngine::new(CACHED_MEMCACHED);
    let cli = stub.cli();
    image::check_image(&cli, &ImageRef::new("postgres")).expect("pull succeeds");

    let log = stub.invocations();
    assert_eq!(log, vec!["images --no-trunc", "pull postgres"]);
}

#[test]
fn repository_prefix_is_not_a_cache_hit() {
    let stub = StubEngine::new(CACHED_MEMCACHED);
    let cli = stub.cli();
    // redis-stack is cached; plain redis must not match it.
    assert!(!image::have_image(&cli, &ImageRef::new("redis")).expect("listing"));
    assert!(image::have_image(&cli, &ImageRef::new("redis-stack")).expect("listing"));
}

#[test]
fn failed_pull_carries_engine_output() {
    let stub = StubEngine::new(
        r#"case "$1" in
  images) echo 'REPOSITORY TAG IMAGE ID CREATED SIZE' ;;
  pull) echo 'manifest unknown' >&2; exit 1 ;;
esac
exit 0"#,
    );
    let err = image::check_image(&stub.cli(), &ImageRef::new("no/such-image")).unwrap_err();
    match err {
        BerthError::PullFailed { image, output } => {
            assert_eq!(image, "no/such-image");
            assert!(output.contains("manifest unknown"));
        }
        other => panic!("expected PullFailed, got {other}"),
    }
}

#[test]
fn failed_image_listing_is_an_error() {
    let stub = StubEngine::new(r#"echo 'cannot connect to engine daemon' >&2; exit 1"#);
    let err = image::have_image(&stub.cli(), &ImageRef::new("memcached")).unwrap_err();
    assert!(matches!(err, BerthError::ImageListFailed { .. }));
}

#[test]
fn run_publishes_ports_and_returns_trimmed_id() {
    let stub = StubEngine::new(
        r#"case "$1" in
  run) echo 'cafebabe0001  ' ;;
esac
exit 0"#,
    );
    let id = stub.cli().run(&ImageRef::new("memcached")).expect("run");
    assert_eq!(id.as_str(), "cafebabe0001");

    let log = stub.invocations();
    assert_eq!(log.len(), 1);
    assert!(log[0].starts_with("run -dP --name berth-"));
    assert!(log[0].ends_with(" memcached"));
}

#[test]
fn silent_run_is_a_distinct_failure() {
    let stub = StubEngine::new("exit 0");
    let err = stub.cli().run(&ImageRef::new("memcached")).unwrap_err();
    assert!(matches!(err, BerthError::RunEmptyOutput { .. }));
}

#[test]
fn failed_run_carries_engine_output() {
    let stub = StubEngine::new(
        r#"case "$1" in
  run) echo 'port is already allocated' >&2; exit 125 ;;
esac
exit 0"#,
    );
    let err = stub.cli().run(&ImageRef::new("memcached")).unwrap_err();
    match err {
        BerthError::RunFailed { output, .. } => assert!(output.contains("already allocated")),
        other => panic!("expected RunFailed, got {other}"),
    }
}

#[test]
fn second_kill_of_same_container_errors() {
    let stub = StubEngine::new(
        r#"case "$1" in
  kill)
    if [ -e "$STATE/killed" ]; then echo 'No such container' >&2; exit 1; fi
    : > "$STATE/killed" ;;
esac
exit 0"#,
    );
    let cli = stub.cli();
    let id = ContainerId::new("cafebabe0001");
    cli.kill(&id).expect("first kill");
    let err = cli.kill(&id).unwrap_err();
    match err {
        BerthError::KillFailed { id, output } => {
            assert_eq!(id, "cafebabe0001");
            assert!(output.contains("No such container"));
        }
        other => panic!("expected KillFailed, got {other}"),
    }
}

#[test]
fn keep_containers_suppresses_remove_without_invoking_engine() {
    let stub = StubEngine::new("exit 0");
    let config = FixtureConfig {
        keep_containers: true,
        ..stub.config()
    };
    let cli = EngineCli::new(config);
    cli.remove(&ContainerId::new("cafebabe0001"))
        .expect("suppressed remove succeeds");
    assert!(stub.invocations().is_empty(), "engine must not be invoked");
}

#[test]
fn remove_passes_volume_flag() {
    let stub = StubEngine::new("exit 0");
    stub.cli()
        .remove(&ContainerId::new("cafebabe0001"))
        .expect("remove");
    assert_eq!(stub.invocations(), vec!["rm -v cafebabe0001"]);
}

#[test]
fn image_remove_failure_surfaces_not_swallowed() {
    let stub = StubEngine::new(
        r#"case "$1" in
  rmi) echo 'image is being used by running container' >&2; exit 1 ;;
esac
exit 0"#,
    );
    let err = stub
        .cli()
        .remove_image(&ImageRef::new("memcached"))
        .unwrap_err();
    assert!(matches!(err, BerthError::ImageRemoveFailed { .. }));
}

#[test]
fn inspect_returns_trimmed_query_output() {
    let stub = StubEngine::new(
        r#"case "$1" in
  inspect) echo '172.17.0.2' ;;
esac
exit 0"#,
    );
    let out = stub
        .cli()
        .inspect(&ContainerId::new("cafebabe0001"), "{{ .NetworkSettings.IPAddress }}")
        .expect("inspect");
    assert_eq!(out, "172.17.0.2");
    assert_eq!(
        stub.invocations(),
        vec!["inspect --format {{ .NetworkSettings.IPAddress }} cafebabe0001"]
    );
}
