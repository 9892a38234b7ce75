// src/exec/mod.rs

//! Process supervision layer.
//!
//! Runs one external command under a deadline using `tokio::process`,
//! draining stdout and stderr concurrently so the child can never stall on
//! a full pipe.
//!
//! - [`spec`] holds the immutable [`CommandSpec`] handed in by the caller.
//! - [`supervisor`] owns the spawn / wait-with-timeout / classify flow.
//! - [`drain`] contains the per-pipe drain tasks and [`CapturedLine`].
//! - [`sink`] defines where captured lines go ([`LineSink`]).
//! - [`outcome`] holds [`RunResult`], its verdict and the [`RunReport`].
//! - `terminate` kills a timed-out child and its process group.

pub mod drain;
pub mod outcome;
pub mod sink;
pub mod spec;
pub mod supervisor;
mod terminate;

pub use drain::{CapturedLine, DrainSummary, Stream};
pub use outcome::{RunFailure, RunReport, RunResult};
pub use sink::{DiscardSink, LineSink, PrefixedPrinter, TracingSink};
pub use spec::CommandSpec;
pub use supervisor::{
    DEFAULT_DRAIN_GRACE, DEFAULT_KILL_GRACE, DEFAULT_TIMEOUT, Supervisor, SupervisorOptions,
    launch,
};
