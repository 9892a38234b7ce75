// src/exec/sink.rs

//! Where captured output lines go.
//!
//! Lines are diagnostics only: nothing a sink does can change the outcome of
//! a run. The drain tasks call [`LineSink::emit`] once per line, from two
//! different tasks, so implementations must be `Send + Sync`.

use std::io::Write;

use tracing::{debug, warn};

use super::drain::CapturedLine;

/// Receiver for lines captured from a child's stdout/stderr.
pub trait LineSink: Send + Sync {
    fn emit(&self, line: &CapturedLine);
}

/// Print every line to our own stdout, prefixed with `[stdout]` / `[stderr]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixedPrinter;

impl LineSink for PrefixedPrinter {
    fn emit(&self, line: &CapturedLine) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "[{}] {}", line.stream, line.text) {
            warn!(stream = %line.stream, error = %e, "failed to print captured line");
        }
    }
}

/// Log lines through `tracing` at debug level instead of printing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LineSink for TracingSink {
    fn emit(&self, line: &CapturedLine) {
        debug!(stream = %line.stream, seq = line.seq, "{}", line.text);
    }
}

/// Drop everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl LineSink for DiscardSink {
    fn emit(&self, _line: &CapturedLine) {}
}
