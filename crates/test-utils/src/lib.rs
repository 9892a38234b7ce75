pub mod sinks;

use std::sync::{Arc, Once};
use std::time::Duration;

use clientrun::exec::{CommandSpec, LineSink, Supervisor, SupervisorOptions};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a timeout, panicking if it does not finish.
///
/// Guards tests whose failure mode would otherwise be a hang.
pub async fn with_timeout<F, T>(limit: Duration, f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(limit, f)
        .await
        .unwrap_or_else(|_| panic!("test timed out after {limit:?}"))
}

/// A supervisor with the given run timeout and short grace periods.
pub fn supervisor(timeout: Duration, sink: Arc<dyn LineSink>) -> Supervisor {
    let options = SupervisorOptions {
        timeout,
        kill_grace: Duration::from_secs(2),
        drain_grace: Duration::from_secs(2),
    };
    Supervisor::new(options).with_sink(sink)
}

/// `/bin/sh -c <script>`.
pub fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("/bin/sh", ["-c", script])
}
