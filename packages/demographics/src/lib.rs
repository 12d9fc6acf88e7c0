#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory store of county demographic records.
//!
//! Records are loaded once from a delimited text file ([`load`]) and are
//! immutable afterwards. The [`queries`] module runs the single-pass
//! aggregations (state counts, threshold filters, population totals and
//! population-weighted percentages) over a [`RecordStore`].

pub mod load;
pub mod queries;

use county_stats_demographics_models::{DemographicRecord, FieldNotFound, PercentField};
use thiserror::Error;

pub use load::{LoadOptions, LoadReport, LoadedStore, load, load_path};

/// Fatal errors that abort loading a data file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The data file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Io {
        /// Path of the file that failed to open.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Reading the underlying stream failed mid-file.
    #[error("Failed to read data: {0}")]
    Read(#[from] std::io::Error),
}

/// A single data row that was skipped during loading.
///
/// Row errors never abort a load; they are collected in the
/// [`LoadReport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// The row has fewer cells than the schema requires.
    #[error("line {line}: expected {expected} fields, found {found}")]
    TooFewFields {
        /// 1-based line number in the data file.
        line: u64,
        /// Number of cells required.
        expected: usize,
        /// Number of cells present.
        found: usize,
    },

    /// The row could not be decoded (e.g. invalid UTF-8).
    #[error("line {line}: unreadable row: {message}")]
    Unreadable {
        /// 1-based line number in the data file.
        line: u64,
        /// Reader error description.
        message: String,
    },
}

impl RowError {
    /// Line number the error refers to.
    #[must_use]
    pub const fn line(&self) -> u64 {
        match self {
            Self::TooFewFields { line, .. } | Self::Unreadable { line, .. } => *line,
        }
    }
}

/// Ordered, immutable collection of [`DemographicRecord`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<DemographicRecord>,
}

impl RecordStore {
    /// Creates a store holding `records` in the given order.
    #[must_use]
    pub const fn from_records(records: Vec<DemographicRecord>) -> Self {
        Self { records }
    }

    /// Number of records in the store.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates the records in load order. Each call starts a fresh pass.
    pub fn iter(&self) -> std::slice::Iter<'_, DemographicRecord> {
        self.records.iter()
    }

    /// Returns the records as a slice, in load order.
    #[must_use]
    pub fn records(&self) -> &[DemographicRecord] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a DemographicRecord;
    type IntoIter = std::slice::Iter<'a, DemographicRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Reads the percentage column labelled `field_name` from `record`.
///
/// A legitimate value of `0.0` is returned as `Ok(0.0)`; only labels that
/// are not in the catalog produce an error.
///
/// # Errors
///
/// Returns [`FieldNotFound`] if `field_name` is not a known field label.
pub fn field_value(record: &DemographicRecord, field_name: &str) -> Result<f64, FieldNotFound> {
    PercentField::lookup(field_name).map(|field| field.value(record))
}
