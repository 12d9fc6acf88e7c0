#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Operation scripts and the report engine that runs them.
//!
//! An operation script has one operation per line (see [`operation`] for the
//! grammar). The [`engine`] parses each line, runs it against a loaded
//! [`county_stats_demographics::RecordStore`], and writes the rendered
//! result. Lines that fail to parse are logged and skipped; only I/O
//! failures stop a script.

pub mod engine;
pub mod operation;

use thiserror::Error;

pub use engine::{
    OperationResult, ScriptSummary, SkippedOperation, execute, run_script, run_script_path,
};
pub use operation::{Keyword, Operation, OperationParseError};

/// Errors that stop a script from running to completion.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The operations file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Open {
        /// Path of the file that failed to open.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Reading the script or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
