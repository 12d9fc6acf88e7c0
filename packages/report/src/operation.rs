//! Operation script line grammar.
//!
//! ```text
//! display
//! filter-state:<STATE>
//! filter:<FIELD>:<ge|le>:<NUMBER>
//! population-total
//! population:<FIELD>
//! percent:<FIELD>
//! ```
//!
//! The keyword is everything before the first `:`. `<FIELD>` must be one of
//! the [`PercentField`] labels and is resolved while parsing, so an
//! [`Operation`] never carries an unknown field.

use std::str::FromStr;

use county_stats_demographics_models::{Comparison, FieldNotFound, PercentField};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Operation keywords, as written in a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Keyword {
    /// `display`
    Display,
    /// `filter-state`
    FilterState,
    /// `filter`
    Filter,
    /// `population-total`
    PopulationTotal,
    /// `population`
    Population,
    /// `percent`
    Percent,
}

/// A parsed script operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// List every record as `county, state`.
    Display,
    /// Count records in `state`.
    FilterState {
        /// State to match exactly.
        state: String,
    },
    /// Count records whose `field` satisfies `comparison` against
    /// `threshold`.
    Filter {
        /// Field to compare.
        field: PercentField,
        /// `ge` or `le`.
        comparison: Comparison,
        /// Value to compare against.
        threshold: f64,
    },
    /// Sum of all populations.
    PopulationTotal,
    /// Population-weighted total of `field`.
    Population {
        /// Field used as the percentage weight.
        field: PercentField,
    },
    /// Population-weighted percentage of `field`.
    Percent {
        /// Field used as the percentage weight.
        field: PercentField,
    },
}

/// Why a script line could not be turned into an [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationParseError {
    /// The keyword is not a known operation.
    #[error("unrecognized operation '{0}'")]
    UnknownOperation(String),

    /// A required argument is missing or empty.
    #[error("'{keyword}' is missing its {argument} argument")]
    MissingArgument {
        /// Operation being parsed.
        keyword: Keyword,
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// Arguments were given to an operation that takes none.
    #[error("'{0}' takes no arguments")]
    UnexpectedArgument(Keyword),

    /// The filter comparison is not `ge` or `le`.
    #[error("unknown comparison '{0}', expected 'ge' or 'le'")]
    UnknownComparison(String),

    /// The filter threshold is not a finite number.
    #[error("invalid threshold '{0}'")]
    InvalidThreshold(String),

    /// The field label is not in the catalog.
    #[error(transparent)]
    UnknownField(#[from] FieldNotFound),
}

impl Operation {
    /// Parses a single, already trimmed, script line.
    ///
    /// # Errors
    ///
    /// Returns [`OperationParseError`] if the keyword is unknown or its
    /// arguments are malformed.
    pub fn parse(line: &str) -> Result<Self, OperationParseError> {
        let (name, args) = match line.split_once(':') {
            Some((name, args)) => (name, Some(args)),
            None => (line, None),
        };

        let keyword = Keyword::from_str(name)
            .map_err(|_| OperationParseError::UnknownOperation(name.to_owned()))?;

        match keyword {
            Keyword::Display => no_args(keyword, args).map(|()| Self::Display),
            Keyword::PopulationTotal => no_args(keyword, args).map(|()| Self::PopulationTotal),
            Keyword::FilterState => Ok(Self::FilterState {
                state: required(keyword, args, "state")?.to_owned(),
            }),
            Keyword::Filter => parse_filter(required(keyword, args, "field:op:value")?),
            Keyword::Population => Ok(Self::Population {
                field: PercentField::lookup(required(keyword, args, "field")?)?,
            }),
            Keyword::Percent => Ok(Self::Percent {
                field: PercentField::lookup(required(keyword, args, "field")?)?,
            }),
        }
    }

    /// The keyword this operation was parsed from.
    #[must_use]
    pub const fn keyword(&self) -> Keyword {
        match self {
            Self::Display => Keyword::Display,
            Self::FilterState { .. } => Keyword::FilterState,
            Self::Filter { .. } => Keyword::Filter,
            Self::PopulationTotal => Keyword::PopulationTotal,
            Self::Population { .. } => Keyword::Population,
            Self::Percent { .. } => Keyword::Percent,
        }
    }
}

impl FromStr for Operation {
    type Err = OperationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

const fn no_args(keyword: Keyword, args: Option<&str>) -> Result<(), OperationParseError> {
    match args {
        None => Ok(()),
        Some(_) => Err(OperationParseError::UnexpectedArgument(keyword)),
    }
}

fn required<'a>(
    keyword: Keyword,
    args: Option<&'a str>,
    argument: &'static str,
) -> Result<&'a str, OperationParseError> {
    args.filter(|a| !a.is_empty())
        .ok_or(OperationParseError::MissingArgument { keyword, argument })
}

/// Parses `<FIELD>:<op>:<value>`, splitting on the last two colons so the
/// field label is taken verbatim.
fn parse_filter(args: &str) -> Result<Operation, OperationParseError> {
    let mut parts = args.rsplitn(3, ':');
    let (Some(value), Some(op), Some(field)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(OperationParseError::MissingArgument {
            keyword: Keyword::Filter,
            argument: "field:op:value",
        });
    };

    if field.is_empty() {
        return Err(OperationParseError::MissingArgument {
            keyword: Keyword::Filter,
            argument: "field",
        });
    }

    let field = PercentField::lookup(field)?;
    let comparison = Comparison::from_str(op)
        .map_err(|_| OperationParseError::UnknownComparison(op.to_owned()))?;
    let threshold = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| OperationParseError::InvalidThreshold(value.to_owned()))?;

    Ok(Operation::Filter {
        field,
        comparison,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_argument_free_operations() {
        assert_eq!(Operation::parse("display"), Ok(Operation::Display));
        assert_eq!(
            Operation::parse("population-total"),
            Ok(Operation::PopulationTotal)
        );
    }

    #[test]
    fn rejects_arguments_on_argument_free_operations() {
        assert_eq!(
            Operation::parse("display:now"),
            Err(OperationParseError::UnexpectedArgument(Keyword::Display))
        );
    }

    #[test]
    fn parses_filter_state_verbatim() {
        assert_eq!(
            Operation::parse("filter-state:New Mexico"),
            Ok(Operation::FilterState {
                state: "New Mexico".to_string()
            })
        );
        assert_eq!(
            Operation::parse("filter-state:"),
            Err(OperationParseError::MissingArgument {
                keyword: Keyword::FilterState,
                argument: "state",
            })
        );
    }

    #[test]
    fn parses_field_filter() {
        assert_eq!(
            Operation::parse("filter:Education.Bachelor's Degree or Higher:ge:25.5"),
            Ok(Operation::Filter {
                field: PercentField::EducationBachelors,
                comparison: Comparison::Ge,
                threshold: 25.5,
            })
        );
        assert_eq!(
            Operation::parse("filter:Income.Persons Below Poverty Level:le:10"),
            Ok(Operation::Filter {
                field: PercentField::IncomeBelowPoverty,
                comparison: Comparison::Le,
                threshold: 10.0,
            })
        );
    }

    #[test]
    fn filter_errors_are_specific() {
        assert_eq!(
            Operation::parse("filter:Ethnicities.White Alone:lt:10"),
            Err(OperationParseError::UnknownComparison("lt".to_string()))
        );
        assert_eq!(
            Operation::parse("filter:Ethnicities.White Alone:ge:ten"),
            Err(OperationParseError::InvalidThreshold("ten".to_string()))
        );
        assert_eq!(
            Operation::parse("filter:Ethnicities.White Alone:ge:NaN"),
            Err(OperationParseError::InvalidThreshold("NaN".to_string()))
        );
        assert!(matches!(
            Operation::parse("filter:Ethnicities.White Alone:ge"),
            Err(OperationParseError::MissingArgument { .. })
        ));
        assert!(matches!(
            Operation::parse("filter::ge:10"),
            Err(OperationParseError::MissingArgument { .. })
        ));
    }

    #[test]
    fn unknown_field_is_reported_not_defaulted() {
        assert_eq!(
            Operation::parse("percent:Age.Percent 65 and Older"),
            Err(OperationParseError::UnknownField(FieldNotFound {
                name: "Age.Percent 65 and Older".to_string()
            }))
        );
        assert!(matches!(
            Operation::parse("filter:Income.Median Household Income:ge:50000"),
            Err(OperationParseError::UnknownField(_))
        ));
        assert!(matches!(
            Operation::parse("population:"),
            Err(OperationParseError::MissingArgument { .. })
        ));
    }

    #[test]
    fn parses_weighted_operations() {
        assert_eq!(
            Operation::parse("population:Ethnicities.Hispanic or Latino"),
            Ok(Operation::Population {
                field: PercentField::EthnicitiesHispanic
            })
        );
        assert_eq!(
            "percent:Ethnicities.Black Alone".parse::<Operation>(),
            Ok(Operation::Percent {
                field: PercentField::EthnicitiesBlack
            })
        );
    }

    #[test]
    fn unknown_keyword() {
        assert_eq!(
            Operation::parse("average:Ethnicities.White Alone"),
            Err(OperationParseError::UnknownOperation("average".to_string()))
        );
        assert_eq!(
            Operation::parse("Display"),
            Err(OperationParseError::UnknownOperation("Display".to_string()))
        );
    }

    #[test]
    fn keyword_roundtrip() {
        for line in [
            "display",
            "filter-state:CA",
            "filter:Ethnicities.White Alone:ge:1",
            "population-total",
            "population:Ethnicities.White Alone",
            "percent:Ethnicities.White Alone",
        ] {
            let op = Operation::parse(line).unwrap();
            let name = line.split(':').next().unwrap();
            assert_eq!(op.keyword().to_string(), name);
        }
    }
}
