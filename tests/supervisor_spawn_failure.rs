use std::sync::Arc;
use std::time::Duration;

use clientrun::exec::{CommandSpec, RunResult};
use clientrun_test_utils::sinks::RecordingSink;
use clientrun_test_utils::{init_tracing, sh, supervisor, with_timeout};

const LIMIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn missing_binary_is_spawn_failure() {
    init_tracing();
    let sink = Arc::new(RecordingSink::new());
    let spec = CommandSpec::new("/no/such/binary", Vec::<String>::new());

    let report = with_timeout(LIMIT, supervisor(LIMIT, sink.clone()).run(&spec)).await;

    match &report.result {
        RunResult::SpawnFailed { cause } => {
            assert!(
                cause.to_lowercase().contains("no such file"),
                "unexpected cause: {cause}"
            );
        }
        other => panic!("expected SpawnFailed, got {other:?}"),
    }
    assert!(report.pid.is_none());
    assert!(sink.lines().is_empty());
    assert!(
        report
            .result
            .verdict()
            .unwrap_err()
            .to_string()
            .starts_with("spawn failed: ")
    );
}

#[tokio::test]
async fn missing_working_dir_is_spawn_failure() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let spec = sh("true").with_working_dir(dir.path().join("gone"));

    let result = with_timeout(
        LIMIT,
        supervisor(LIMIT, Arc::new(RecordingSink::new())).launch(&spec),
    )
    .await;

    assert!(matches!(result, RunResult::SpawnFailed { .. }), "got {result:?}");
}

#[cfg(unix)]
#[tokio::test]
async fn non_executable_file_is_spawn_failure() {
    use std::os::unix::fs::PermissionsExt;

    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("client.sh");
    std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644)).unwrap();

    let spec = CommandSpec::new(&script, Vec::<String>::new());
    let result = with_timeout(
        LIMIT,
        supervisor(LIMIT, Arc::new(RecordingSink::new())).launch(&spec),
    )
    .await;

    match result {
        RunResult::SpawnFailed { cause } => {
            assert!(cause.to_lowercase().contains("permission denied"), "{cause}");
        }
        other => panic!("expected SpawnFailed, got {other:?}"),
    }
}
