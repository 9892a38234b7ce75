// src/exec/drain.rs

//! Drain tasks: one per output pipe.
//!
//! Each task owns its pipe exclusively and reads it until end-of-stream,
//! handing every line to the shared [`LineSink`]. A read error stops only
//! the task that hit it; the run itself is judged on exit status alone.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::sink::LineSink;

/// Which of the child's output pipes a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn as_str(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of child output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    pub stream: Stream,
    /// Line content without the trailing newline.
    pub text: String,
    /// Zero-based index of this line within its stream.
    pub seq: u64,
}

/// What a drain task saw before it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainSummary {
    pub stream: Stream,
    pub lines: u64,
    /// Set when the task stopped on a read error instead of end-of-stream.
    pub read_error: Option<String>,
}

impl DrainSummary {
    pub(crate) fn empty(stream: Stream) -> Self {
        Self {
            stream,
            lines: 0,
            read_error: None,
        }
    }
}

/// A running drain task plus its live line count.
///
/// The count stays readable after the task is aborted, so a drain cut short
/// by the grace period still reports how many lines it delivered.
pub(crate) struct DrainHandle {
    pub(crate) task: JoinHandle<DrainSummary>,
    pub(crate) lines: Arc<AtomicU64>,
}

/// Spawn a drain task for one pipe.
pub(crate) fn spawn_drain<R>(stream: Stream, reader: R, sink: Arc<dyn LineSink>) -> DrainHandle
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let lines = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&lines);
    let task = tokio::spawn(async move {
        drain_counted(stream, reader, sink.as_ref(), &counter).await
    });

    DrainHandle { task, lines }
}

/// Read `reader` line by line until EOF or the first read error.
///
/// Lines are split on `\n`; a trailing `\r` is dropped as well. Invalid
/// UTF-8 is replaced rather than treated as an error so a binary blob on
/// stderr cannot stop the pipe from being emptied.
pub async fn drain_lines<R>(stream: Stream, reader: R, sink: &dyn LineSink) -> DrainSummary
where
    R: AsyncRead + Unpin,
{
    drain_counted(stream, reader, sink, &AtomicU64::new(0)).await
}

async fn drain_counted<R>(
    stream: Stream,
    reader: R,
    sink: &dyn LineSink,
    counter: &AtomicU64,
) -> DrainSummary
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(256);
    let mut summary = DrainSummary::empty(stream);

    debug!(%stream, "drain started");

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = CapturedLine {
                    stream,
                    text: decode_line(&buf),
                    seq: summary.lines,
                };
                sink.emit(&line);
                summary.lines += 1;
                counter.store(summary.lines, Ordering::Relaxed);
            }
            Err(e) => {
                error!(%stream, lines = summary.lines, error = %e, "read error; stopping drain");
                summary.read_error = Some(e.to_string());
                break;
            }
        }
    }

    debug!(%stream, lines = summary.lines, "drain finished");
    summary
}

fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && raw[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::task::{Context, Poll};

    use tokio::io::ReadBuf;

    #[derive(Default)]
    struct Collect(Mutex<Vec<CapturedLine>>);

    impl LineSink for Collect {
        fn emit(&self, line: &CapturedLine) {
            self.0.lock().unwrap().push(line.clone());
        }
    }

    impl Collect {
        fn texts(&self) -> Vec<String> {
            self.0.lock().unwrap().iter().map(|l| l.text.clone()).collect()
        }
    }

    /// Yields `data` once, then fails every subsequent read.
    struct FailAfter {
        data: Option<&'static [u8]>,
    }

    impl AsyncRead for FailAfter {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.data.take() {
                Some(data) => {
                    buf.put_slice(data);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "pipe went away",
                ))),
            }
        }
    }

    #[tokio::test]
    async fn splits_lines_and_numbers_them_per_stream() {
        let sink = Collect::default();
        let input: &[u8] = b"one\ntwo\r\nthree";

        let summary = drain_lines(Stream::Stdout, input, &sink).await;

        assert_eq!(summary.lines, 3);
        assert!(summary.read_error.is_none());
        assert_eq!(sink.texts(), vec!["one", "two", "three"]);

        let seqs: Vec<u64> = sink.0.lock().unwrap().iter().map(|l| l.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert!(sink.0.lock().unwrap().iter().all(|l| l.stream == Stream::Stdout));
    }

    #[tokio::test]
    async fn keeps_empty_lines() {
        let sink = Collect::default();
        let input: &[u8] = b"a\n\nb\n";

        let summary = drain_lines(Stream::Stderr, input, &sink).await;

        assert_eq!(summary.lines, 3);
        assert_eq!(sink.texts(), vec!["a", "", "b"]);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_fatal() {
        let sink = Collect::default();
        let input: &[u8] = b"ok\n\xff\xfe\nafter\n";

        let summary = drain_lines(Stream::Stderr, input, &sink).await;

        assert_eq!(summary.lines, 3);
        assert!(summary.read_error.is_none());
        assert_eq!(sink.texts()[2], "after");
        assert!(sink.texts()[1].contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn read_error_stops_drain_and_is_recorded() {
        let sink = Collect::default();
        let reader = FailAfter {
            data: Some(b"first\nsecond\n"),
        };

        let summary = drain_lines(Stream::Stdout, reader, &sink).await;

        assert_eq!(summary.lines, 2);
        assert_eq!(sink.texts(), vec!["first", "second"]);
        let err = summary.read_error.expect("read error should be recorded");
        assert!(err.contains("pipe went away"));
    }

    #[test]
    fn stream_display_matches_prefix() {
        assert_eq!(Stream::Stdout.to_string(), "stdout");
        assert_eq!(Stream::Stderr.to_string(), "stderr");
    }
}
