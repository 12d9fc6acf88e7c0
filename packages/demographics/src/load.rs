//! Delimited-text loader for the record store.
//!
//! The first line of the input is a header and is always discarded. Every
//! following row must carry at least [`COLUMN_COUNT`] cells in schema
//! order: county, state, the five education/ethnicity percentages, median
//! income, per capita income, poverty percentage and 2014 population.
//!
//! Cells use ordinary CSV quoting within a line: quoted cells lose their
//! wrapping quotes, bare cells are taken as-is, and surrounding whitespace is
//! trimmed. Quotes never span lines.
//!
//! Numeric cells that cannot be parsed are coerced to `0` and logged rather
//! than rejecting the row. This is a deliberate lossy fallback inherited
//! from the data set's producers; [`LoadReport::coerced_cells`] counts how
//! often it happened.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use county_stats_demographics_models::{COLUMN_COUNT, DemographicRecord};

use crate::{LoadError, RecordStore, RowError};

/// Default upper bound on the number of records a single load will keep.
pub const DEFAULT_MAX_RECORDS: usize = 5000;

const COLUMNS: [&str; COLUMN_COUNT] = [
    "county",
    "state",
    "education_high_school",
    "education_bachelors",
    "ethnicities_white",
    "ethnicities_black",
    "ethnicities_hispanic",
    "income_median",
    "income_per_capita",
    "income_below_poverty",
    "population_2014",
];

/// Tunables for [`load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Maximum number of records to keep. Rows past this limit are counted
    /// in [`LoadReport::dropped`] and discarded.
    pub max_records: usize,
    /// Cell delimiter byte.
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            delimiter: b',',
        }
    }
}

/// What happened during a load, apart from the records themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of records kept.
    pub loaded: usize,
    /// Rows that were skipped, in file order.
    pub row_errors: Vec<RowError>,
    /// Data rows discarded because the record limit was reached.
    pub dropped: u64,
    /// Numeric cells that failed to parse and were coerced to `0`.
    pub coerced_cells: u64,
}

impl LoadReport {
    /// Returns `true` if the record limit cut the load short.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.dropped > 0
    }
}

/// A populated store together with its [`LoadReport`].
#[derive(Debug, Clone)]
pub struct LoadedStore {
    /// The loaded records.
    pub store: RecordStore,
    /// Row-level diagnostics from the load.
    pub report: LoadReport,
}

/// Opens `path` and loads it with [`load`].
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be opened, or any error
/// [`load`] returns.
pub fn load_path(path: impl AsRef<Path>, options: &LoadOptions) -> Result<LoadedStore, LoadError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    log::debug!("Loading demographics from {}", path.display());

    load(file, options)
}

/// Loads demographic records from delimited text.
///
/// Every physical line is its own row: a quote left open on one line never
/// swallows the next. Blank lines are ignored. Malformed rows are skipped
/// and recorded in the returned [`LoadReport`]; they never abort the load.
///
/// # Errors
///
/// Returns [`LoadError::Read`] if the underlying reader fails.
pub fn load(reader: impl Read, options: &LoadOptions) -> Result<LoadedStore, LoadError> {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All);

    let mut records = Vec::new();
    let mut report = LoadReport::default();
    let mut line = 0u64;

    for bytes in BufReader::new(reader).split(b'\n') {
        let bytes = bytes?;
        line += 1;

        if line == 1 || bytes.trim_ascii().is_empty() {
            continue;
        }

        let row = match read_row(&builder, &bytes, line) {
            Ok(row) => row,
            Err(e) => {
                skip_row(&mut report, e);
                continue;
            }
        };

        if records.len() >= options.max_records {
            report.dropped += 1;
            continue;
        }

        match parse_row(&row, line) {
            Ok((record, coerced)) => {
                report.coerced_cells += coerced;
                records.push(record);
            }
            Err(e) => skip_row(&mut report, e),
        }
    }

    if report.is_truncated() {
        log::warn!(
            "Maximum record limit of {} exceeded; {} rows dropped",
            options.max_records,
            report.dropped
        );
    }

    report.loaded = records.len();
    log::info!("{} records loaded", report.loaded);

    Ok(LoadedStore {
        store: RecordStore::from_records(records),
        report,
    })
}

/// Splits one physical line into cells.
fn read_row(
    builder: &csv::ReaderBuilder,
    bytes: &[u8],
    line: u64,
) -> Result<csv::StringRecord, RowError> {
    let mut row = csv::StringRecord::new();
    match builder.from_reader(bytes).read_record(&mut row) {
        Ok(_) => Ok(row),
        Err(e) => {
            let message = match e.kind() {
                csv::ErrorKind::Utf8 { err, .. } => err.to_string(),
                _ => e.to_string(),
            };
            Err(RowError::Unreadable { line, message })
        }
    }
}

fn skip_row(report: &mut LoadReport, error: RowError) {
    log::warn!("Skipping row: {error}");
    report.row_errors.push(error);
}

fn parse_row(row: &csv::StringRecord, line: u64) -> Result<(DemographicRecord, u64), RowError> {
    if row.len() < COLUMN_COUNT {
        return Err(RowError::TooFewFields {
            line,
            expected: COLUMN_COUNT,
            found: row.len(),
        });
    }
    if row.len() > COLUMN_COUNT {
        log::debug!(
            "line {line}: ignoring {} trailing fields",
            row.len() - COLUMN_COUNT
        );
    }

    let mut cells = Cells {
        row,
        line,
        coerced: 0,
    };

    let record = DemographicRecord {
        county: cells.text(0),
        state: cells.text(1),
        education_high_school: cells.percent(2),
        education_bachelors: cells.percent(3),
        ethnicities_white: cells.percent(4),
        ethnicities_black: cells.percent(5),
        ethnicities_hispanic: cells.percent(6),
        income_median: cells.integer(7),
        income_per_capita: cells.integer(8),
        income_below_poverty: cells.percent(9),
        population_2014: cells.population(10),
    };

    Ok((record, cells.coerced))
}

/// Numeric cell reader for a single row that tracks coercions.
struct Cells<'a> {
    row: &'a csv::StringRecord,
    line: u64,
    coerced: u64,
}

impl Cells<'_> {
    fn text(&self, index: usize) -> String {
        let cell = &self.row[index];
        if has_stray_quote(cell) {
            log::debug!(
                "line {}: {} value '{}' contains a stray quote",
                self.line,
                COLUMNS[index],
                cell
            );
        }
        cell.to_owned()
    }

    fn percent(&mut self, index: usize) -> f64 {
        let cell = &self.row[index];
        parse_percent(cell).unwrap_or_else(|| self.coerce(index))
    }

    fn integer(&mut self, index: usize) -> i64 {
        let cell = &self.row[index];
        parse_integer(cell).unwrap_or_else(|| self.coerce(index))
    }

    fn population(&mut self, index: usize) -> u64 {
        let cell = &self.row[index];
        parse_population(cell).unwrap_or_else(|| self.coerce(index))
    }

    fn coerce<T: Default>(&mut self, index: usize) -> T {
        log::warn!(
            "line {}: could not parse {} value '{}', using 0",
            self.line,
            COLUMNS[index],
            &self.row[index]
        );
        self.coerced += 1;
        T::default()
    }
}

/// A quote left inside a cell after unquoting means the source quoting was
/// broken, e.g. `"O"Brien County"`.
fn has_stray_quote(cell: &str) -> bool {
    cell.contains('"')
}

fn parse_percent(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer cells accept a fractional value and truncate it toward zero.
#[allow(clippy::cast_possible_truncation)]
fn parse_integer(cell: &str) -> Option<i64> {
    cell.parse::<i64>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_population(cell: &str) -> Option<u64> {
    cell.parse::<u64>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.trunc() as u64)
    })
}
