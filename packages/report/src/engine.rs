//! Executes operations against a record store and renders their results.

use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use county_stats_demographics::{RecordStore, queries};
use county_stats_demographics_models::{Comparison, DemographicRecord, PercentField};

use crate::ReportError;
use crate::operation::{Operation, OperationParseError};

/// The outcome of one operation, ready to render.
///
/// The [`fmt::Display`] implementation produces the report text: one line
/// per record for [`OperationResult::Listing`], a single line otherwise.
/// Floating-point values are rendered with two decimal places.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult<'a> {
    /// Every record, in store order.
    Listing(&'a [DemographicRecord]),
    /// Number of records in a state.
    StateCount {
        /// State that was matched.
        state: String,
        /// Matching records.
        count: usize,
    },
    /// Number of records passing a field threshold.
    FilterCount {
        /// Field compared.
        field: PercentField,
        /// Comparison applied.
        comparison: Comparison,
        /// Threshold compared against.
        threshold: f64,
        /// Matching records.
        count: usize,
    },
    /// Sum of all populations.
    PopulationTotal(u64),
    /// Population-weighted total of a field.
    FieldPopulation {
        /// Weighting field.
        field: PercentField,
        /// Weighted total.
        total: f64,
    },
    /// Population-weighted percentage of a field, or `None` when the total
    /// population is zero.
    FieldPercentage {
        /// Weighting field.
        field: PercentField,
        /// Weighted percentage.
        percentage: Option<f64>,
    },
}

impl fmt::Display for OperationResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing(records) => {
                for (i, record) in records.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}, {}", record.county, record.state)?;
                }
                Ok(())
            }
            Self::StateCount { state, count } => {
                write!(f, "Filter: state == {state} ({count} entries)")
            }
            Self::FilterCount {
                field,
                comparison,
                threshold,
                count,
            } => write!(
                f,
                "Filter: {field} {comparison} {threshold:.2} ({count} entries)"
            ),
            Self::PopulationTotal(total) => write!(f, "2014 population: {total}"),
            Self::FieldPopulation { field, total } => {
                write!(f, "2014 {field} population: {total:.2}")
            }
            Self::FieldPercentage {
                field,
                percentage: Some(pct),
            } => write!(f, "2014 {field} percentage: {pct:.2}"),
            Self::FieldPercentage {
                field,
                percentage: None,
            } => write!(f, "2014 {field} percentage: undefined"),
        }
    }
}

/// Runs a single operation. Never mutates the store.
#[must_use]
pub fn execute<'a>(store: &'a RecordStore, operation: &Operation) -> OperationResult<'a> {
    match operation {
        Operation::Display => OperationResult::Listing(store.records()),
        Operation::FilterState { state } => OperationResult::StateCount {
            state: state.clone(),
            count: queries::count_state(store, state),
        },
        Operation::Filter {
            field,
            comparison,
            threshold,
        } => OperationResult::FilterCount {
            field: *field,
            comparison: *comparison,
            threshold: *threshold,
            count: queries::count_matching(store, *field, *comparison, *threshold),
        },
        Operation::PopulationTotal => {
            OperationResult::PopulationTotal(queries::population_total(store))
        }
        Operation::Population { field } => OperationResult::FieldPopulation {
            field: *field,
            total: queries::weighted_population(store, *field),
        },
        Operation::Percent { field } => {
            let percentage = queries::percentage(store, *field);
            if percentage.is_none() {
                log::warn!("Total population is zero; {field} percentage is undefined");
            }
            OperationResult::FieldPercentage {
                field: *field,
                percentage,
            }
        }
    }
}

/// A script line that was not executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedOperation {
    /// 1-based line number in the script.
    pub line: usize,
    /// Why the line was skipped.
    pub error: OperationParseError,
}

/// Outcome of [`run_script`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    /// Number of operations executed.
    pub executed: usize,
    /// Lines that failed to parse, in script order.
    pub skipped: Vec<SkippedOperation>,
}

/// Opens the script at `path` and runs it with [`run_script`].
///
/// # Errors
///
/// Returns [`ReportError::Open`] if the file cannot be opened, or any error
/// [`run_script`] returns.
pub fn run_script_path(
    store: &RecordStore,
    path: impl AsRef<Path>,
    out: &mut impl Write,
) -> Result<ScriptSummary, ReportError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| ReportError::Open {
        path: path.display().to_string(),
        source: e,
    })?;

    log::debug!("Running operations from {}", path.display());

    run_script(store, BufReader::new(file), out)
}

/// Runs every operation in `script` against `store`, writing each result to
/// `out` in script order.
///
/// Blank lines are ignored. Lines that do not parse are logged with their
/// line number and skipped.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if reading the script or writing output
/// fails.
pub fn run_script(
    store: &RecordStore,
    script: impl BufRead,
    out: &mut impl Write,
) -> Result<ScriptSummary, ReportError> {
    let mut summary = ScriptSummary::default();

    for (index, bytes) in script.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line_number = index + 1;
        let text = String::from_utf8_lossy(&bytes);
        let line = text.trim();

        if line.is_empty() {
            continue;
        }

        match Operation::parse(line) {
            Ok(operation) => {
                log::debug!("line {line_number}: {}", operation.keyword());
                let rendered = execute(store, &operation).to_string();
                if !rendered.is_empty() {
                    writeln!(out, "{rendered}")?;
                }
                summary.executed += 1;
            }
            Err(e) => {
                log::warn!("Invalid operation on line {line_number}: {e}");
                summary.skipped.push(SkippedOperation {
                    line: line_number,
                    error: e,
                });
            }
        }
    }

    out.flush()?;

    Ok(summary)
}
