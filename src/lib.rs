#![forbid(unsafe_code)]
//! packcheck: self-check harness for log compressor implementations
//!
//! Validates an externally-built compressor executable against a gzip
//! baseline on four axes: round-trip correctness, compression ratio,
//! execution speed, and temporary-file hygiene. The compressors are black
//! boxes invoked as subprocesses; this crate is only the verification
//! harness around them.
//!
//! ## Architecture
//!
//! - [`builder`] builds a collaborator project with cargo and resolves
//!   the runnable artifact path (fatal to the run if that fails)
//! - [`runner`] does blocking subprocess invocation with captured output and
//!   wall-clock timing
//! - [`workspace`] provides a per-oracle scratch directory with guaranteed removal
//! - [`suite`] holds the fixed, ordered list of pass/fail oracles
//! - [`driver`] executes the suite, catches per-oracle failures, and
//!   produces the aggregate verdict
//!
//! ## Panic Policy
//!
//! Production code returns `Result` and propagates with `?`; `.unwrap()`
//! and `.expect()` are acceptable in tests only.

pub mod builder;
pub mod cli;
pub mod driver;
pub mod runner;
pub mod suite;
pub mod workspace;

pub use builder::{BuildError, build_artifact};
pub use driver::{HarnessConfig, Outcome, TestRecord, run_oracles, run_suite};
pub use runner::{ExecutionResult, run_binary};
pub use suite::{CheckContext, OracleError, OracleFn, Thresholds, ORACLES};
pub use workspace::{Workspace, with_workspace};
