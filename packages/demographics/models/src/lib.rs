#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County demographic record types and the percentage field catalog.
//!
//! A [`DemographicRecord`] is one county row from the demographics CSV.
//! The percentage columns that reports can query by name are enumerated by
//! [`PercentField`], whose string forms are the human-readable column labels
//! used in operation scripts (e.g. `"Ethnicities.White Alone"`).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of columns in a demographics data row.
pub const COLUMN_COUNT: usize = 11;

/// A single county row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicRecord {
    /// County name (e.g. "Autauga County").
    pub county: String,
    /// State the county belongs to. Matched exactly by state filters.
    pub state: String,
    /// Percent of persons with a high school education or higher.
    pub education_high_school: f64,
    /// Percent of persons with a bachelor's degree or higher.
    pub education_bachelors: f64,
    /// Percent of persons identifying as white alone.
    pub ethnicities_white: f64,
    /// Percent of persons identifying as black alone.
    pub ethnicities_black: f64,
    /// Percent of persons identifying as hispanic or latino.
    pub ethnicities_hispanic: f64,
    /// Median household income.
    pub income_median: i64,
    /// Per capita income.
    pub income_per_capita: i64,
    /// Percent of persons below the poverty level.
    pub income_below_poverty: f64,
    /// 2014 population estimate. Base for all weighted aggregations.
    pub population_2014: u64,
}

/// Percentage columns addressable by name from an operation script.
///
/// The string form of each variant is the label used in the source data
/// set, so `"Ethnicities.White Alone".parse::<PercentField>()` yields
/// [`PercentField::EthnicitiesWhite`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum PercentField {
    /// `Education.High School or Higher`
    #[serde(rename = "Education.High School or Higher")]
    #[strum(serialize = "Education.High School or Higher")]
    EducationHighSchool,
    /// `Education.Bachelor's Degree or Higher`
    #[serde(rename = "Education.Bachelor's Degree or Higher")]
    #[strum(serialize = "Education.Bachelor's Degree or Higher")]
    EducationBachelors,
    /// `Ethnicities.White Alone`
    #[serde(rename = "Ethnicities.White Alone")]
    #[strum(serialize = "Ethnicities.White Alone")]
    EthnicitiesWhite,
    /// `Ethnicities.Black Alone`
    #[serde(rename = "Ethnicities.Black Alone")]
    #[strum(serialize = "Ethnicities.Black Alone")]
    EthnicitiesBlack,
    /// `Ethnicities.Hispanic or Latino`
    #[serde(rename = "Ethnicities.Hispanic or Latino")]
    #[strum(serialize = "Ethnicities.Hispanic or Latino")]
    EthnicitiesHispanic,
    /// `Income.Persons Below Poverty Level`
    #[serde(rename = "Income.Persons Below Poverty Level")]
    #[strum(serialize = "Income.Persons Below Poverty Level")]
    IncomeBelowPoverty,
}

impl PercentField {
    /// Reads this field's value from a record.
    #[must_use]
    pub const fn value(self, record: &DemographicRecord) -> f64 {
        match self {
            Self::EducationHighSchool => record.education_high_school,
            Self::EducationBachelors => record.education_bachelors,
            Self::EthnicitiesWhite => record.ethnicities_white,
            Self::EthnicitiesBlack => record.ethnicities_black,
            Self::EthnicitiesHispanic => record.ethnicities_hispanic,
            Self::IncomeBelowPoverty => record.income_below_poverty,
        }
    }

    /// Looks up a field by its human-readable label.
    ///
    /// Labels are matched exactly, including case.
    ///
    /// # Errors
    ///
    /// Returns [`FieldNotFound`] if `name` is not in the catalog.
    pub fn lookup(name: &str) -> Result<Self, FieldNotFound> {
        Self::from_str(name).map_err(|_| FieldNotFound {
            name: name.to_owned(),
        })
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::EducationHighSchool,
            Self::EducationBachelors,
            Self::EthnicitiesWhite,
            Self::EthnicitiesBlack,
            Self::EthnicitiesHispanic,
            Self::IncomeBelowPoverty,
        ]
    }
}

/// Error returned when a field label is not in the [`PercentField`] catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field '{name}'")]
pub struct FieldNotFound {
    /// The label that was looked up.
    pub name: String,
}

/// Threshold comparison used by numeric field filters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Comparison {
    /// Greater than or equal to the threshold.
    Ge,
    /// Less than or equal to the threshold.
    Le,
}

impl Comparison {
    /// Returns `true` if `value` satisfies this comparison against
    /// `threshold`.
    ///
    /// Plain floating-point comparison with no epsilon tolerance.
    #[must_use]
    pub fn matches(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Ge => value >= threshold,
            Self::Le => value <= threshold,
        }
    }
}
