use std::sync::Arc;
use std::time::Duration;

use clientrun::exec::{RunResult, Stream};
use clientrun_test_utils::sinks::CountingSink;
use clientrun_test_utils::{init_tracing, sh, supervisor, with_timeout};

const TEN_MIB: u64 = 10 * 1024 * 1024;
/// Length of one `yes` line including its newline.
const LINE: u64 = 32;

/// 10 MiB on stderr, a single line on stdout, stdin never read: only
/// independent draining of both pipes lets this finish.
#[tokio::test]
async fn heavy_stderr_does_not_deadlock() {
    init_tracing();
    let sink = Arc::new(CountingSink::new());
    let script = format!(
        "yes 0123456789abcdef0123456789abcde | head -c {TEN_MIB} >&2; echo done"
    );

    let report = with_timeout(
        Duration::from_secs(90),
        supervisor(Duration::from_secs(60), sink.clone()).run(&sh(&script)),
    )
    .await;

    assert_eq!(report.result, RunResult::Completed { exit_code: 0 });

    let full_lines = TEN_MIB / LINE;
    let partial = TEN_MIB % LINE;
    let expected_lines = full_lines + u64::from(partial > 0);

    assert_eq!(sink.lines(Stream::Stdout), 1);
    assert_eq!(sink.lines(Stream::Stderr), expected_lines);
    assert_eq!(report.stderr.lines, expected_lines);
    // Everything but the newlines, plus "done".
    assert_eq!(sink.bytes(), TEN_MIB - full_lines + 4);
}
