use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use clientrun::exec::{CapturedLine, LineSink, Stream};

/// A sink that keeps every line so tests can assert on it.
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<CapturedLine>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<CapturedLine> {
        self.lines.lock().unwrap().clone()
    }

    /// Text of every line from `stream`, in arrival order.
    pub fn texts(&self, stream: Stream) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.stream == stream)
            .map(|l| l.text.clone())
            .collect()
    }
}

impl LineSink for RecordingSink {
    fn emit(&self, line: &CapturedLine) {
        self.lines.lock().unwrap().push(line.clone());
    }
}

/// A sink that only counts, for runs producing too much output to keep.
#[derive(Default)]
pub struct CountingSink {
    stdout_lines: AtomicU64,
    stderr_lines: AtomicU64,
    bytes: AtomicU64,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self, stream: Stream) -> u64 {
        match stream {
            Stream::Stdout => self.stdout_lines.load(Ordering::Relaxed),
            Stream::Stderr => self.stderr_lines.load(Ordering::Relaxed),
        }
    }

    /// Bytes of text seen, newlines excluded.
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

impl LineSink for CountingSink {
    fn emit(&self, line: &CapturedLine) {
        let counter = match line.stream {
            Stream::Stdout => &self.stdout_lines,
            Stream::Stderr => &self.stderr_lines,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(line.text.len() as u64, Ordering::Relaxed);
    }
}
