#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the county demographics report tool.
//!
//! Loads a demographics CSV into memory, then runs an operations script
//! against it and prints one result per operation to stdout. Diagnostics
//! (skipped rows, invalid operations, truncated loads) go to stderr through
//! `pretty_env_logger`, which shows warnings and errors unless `RUST_LOG`
//! says otherwise.

use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use county_stats_demographics::LoadOptions;
use county_stats_demographics::load::DEFAULT_MAX_RECORDS;

#[derive(Parser)]
#[command(
    name = "county_stats",
    about = "Runs an operations script against a county demographics CSV"
)]
struct Cli {
    /// Demographics CSV file. The first line is a header and is skipped.
    data_file: PathBuf,
    /// Operations script, one operation per line
    operations_file: PathBuf,
    /// Maximum number of records to load. Rows past the limit are dropped
    /// and reported.
    #[arg(long, env = "COUNTY_STATS_MAX_RECORDS", default_value_t = DEFAULT_MAX_RECORDS)]
    max_records: usize,
    /// Cell delimiter (a single ASCII character)
    #[arg(
        long,
        env = "COUNTY_STATS_DELIMITER",
        default_value = ",",
        value_parser = parse_delimiter
    )]
    delimiter: u8,
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(format!("expected a single ASCII character, got '{s}'")),
    }
}

fn init_logger() {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_env("RUST_LOG")
        .init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = LoadOptions {
        max_records: cli.max_records,
        delimiter: cli.delimiter,
    };

    let loaded = county_stats_demographics::load_path(&cli.data_file, &options)?;
    if !loaded.report.row_errors.is_empty() {
        let lines: Vec<String> = loaded
            .report
            .row_errors
            .iter()
            .map(|e| e.line().to_string())
            .collect();
        log::warn!(
            "{} malformed rows skipped in {} (lines {})",
            lines.len(),
            cli.data_file.display(),
            lines.join(", ")
        );
    }

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary =
        county_stats_report::run_script_path(&loaded.store, &cli.operations_file, &mut out)?;

    log::info!(
        "{} operations executed, {} skipped",
        summary.executed,
        summary.skipped.len()
    );

    Ok(())
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn delimiter_must_be_one_ascii_char() {
        assert_eq!(parse_delimiter(","), Ok(b','));
        assert_eq!(parse_delimiter("\t"), Ok(b'\t'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["county_stats", "data.csv", "ops.txt"]).unwrap();
        assert_eq!(cli.max_records, DEFAULT_MAX_RECORDS);
        assert_eq!(cli.delimiter, b',');
        assert_eq!(cli.data_file, PathBuf::from("data.csv"));
        assert_eq!(cli.operations_file, PathBuf::from("ops.txt"));
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(Cli::try_parse_from(["county_stats", "data.csv"]).is_err());
        assert!(Cli::try_parse_from(["county_stats", "a", "b", "c"]).is_err());
    }
}
