//! Aggregation queries over a [`RecordStore`].
//!
//! Every query is a single pass over all records. Weighted queries treat a
//! percentage column as the share of the county's 2014 population, so a
//! county of 1,000 people at 25% contributes 250 to the weighted total.

use county_stats_demographics_models::{Comparison, DemographicRecord, PercentField};

use crate::RecordStore;

/// Counts records whose state is exactly `state` (case-sensitive).
#[must_use]
pub fn count_state(store: &RecordStore, state: &str) -> usize {
    store.iter().filter(|r| r.state == state).count()
}

/// Counts records whose `field` value satisfies `comparison` against
/// `threshold`.
#[must_use]
pub fn count_matching(
    store: &RecordStore,
    field: PercentField,
    comparison: Comparison,
    threshold: f64,
) -> usize {
    store
        .iter()
        .filter(|r| comparison.matches(field.value(r), threshold))
        .count()
}

/// Sums the 2014 population of every record.
///
/// Saturates at [`u64::MAX`] instead of overflowing.
#[must_use]
pub fn population_total(store: &RecordStore) -> u64 {
    store
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.population_2014))
}

/// Sums `population_2014 * field / 100` over every record.
#[must_use]
pub fn weighted_population(store: &RecordStore, field: PercentField) -> f64 {
    store.iter().map(|r| weighted(r, field)).sum()
}

/// Population-weighted percentage of `field` across the whole store.
///
/// Returns `None` when the total population is zero (including an empty
/// store), since the ratio is undefined.
#[must_use]
pub fn percentage(store: &RecordStore, field: PercentField) -> Option<f64> {
    let (total, sub) = store.iter().fold((0.0_f64, 0.0_f64), |(total, sub), r| {
        (total + population(r), sub + weighted(r, field))
    });

    if total == 0.0 {
        return None;
    }

    Some(sub / total * 100.0)
}

#[allow(clippy::cast_precision_loss)]
fn population(record: &DemographicRecord) -> f64 {
    record.population_2014 as f64
}

fn weighted(record: &DemographicRecord, field: PercentField) -> f64 {
    population(record) * field.value(record) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::uniform;

    fn scenario() -> RecordStore {
        let mut alpha = uniform("Alpha County", "StateA", 0.0, 1000);
        alpha.education_high_school = 90.0;
        alpha.education_bachelors = 80.0;
        alpha.ethnicities_white = 70.0;
        alpha.ethnicities_black = 10.0;
        alpha.ethnicities_hispanic = 5.0;
        alpha.income_below_poverty = 12.5;

        let mut beta = uniform("Beta County", "StateB", 0.0, 2000);
        beta.education_high_school = 95.0;
        beta.education_bachelors = 85.0;
        beta.ethnicities_white = 75.0;
        beta.ethnicities_black = 15.0;
        beta.ethnicities_hispanic = 10.0;
        beta.income_below_poverty = 8.0;

        RecordStore::from_records(vec![alpha, beta])
    }

    #[test]
    fn counts_state_exactly() {
        let store = scenario();
        assert_eq!(count_state(&store, "StateA"), 1);
        assert_eq!(count_state(&store, "statea"), 0);
        assert_eq!(count_state(&store, "State"), 0);
    }

    #[test]
    fn population_total_is_sum_and_idempotent() {
        let store = scenario();
        assert_eq!(population_total(&store), 3000);
        assert_eq!(population_total(&store), population_total(&store));
    }

    #[test]
    fn population_total_saturates() {
        let store = RecordStore::from_records(vec![
            uniform("A", "S", 1.0, u64::MAX),
            uniform("B", "S", 1.0, 10),
        ]);
        assert_eq!(population_total(&store), u64::MAX);
    }

    #[test]
    fn weighted_population_uses_field_as_percentage() {
        let store = scenario();
        let white = weighted_population(&store, PercentField::EthnicitiesWhite);
        assert!((white - 2200.0).abs() < 1e-9);

        let high_school = weighted_population(&store, PercentField::EducationHighSchool);
        assert!((high_school - 2800.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_is_weighted_by_population() {
        let store = scenario();
        let white = percentage(&store, PercentField::EthnicitiesWhite).unwrap();
        assert_eq!(format!("{white:.2}"), "73.33");

        let high_school = percentage(&store, PercentField::EducationHighSchool).unwrap();
        assert_eq!(format!("{high_school:.2}"), "93.33");
    }

    #[test]
    fn percentage_of_uniform_store_is_the_uniform_value() {
        for pct in [0.0, 12.5, 33.3, 50.0, 99.9, 100.0] {
            let store = RecordStore::from_records(vec![
                uniform("A", "S", pct, 17),
                uniform("B", "S", pct, 12_345),
                uniform("C", "T", pct, 1),
            ]);
            for field in PercentField::all() {
                let result = percentage(&store, *field).unwrap();
                assert!((result - pct).abs() < 1e-9, "{field}: {result} != {pct}");
            }
        }
    }

    #[test]
    fn percentage_with_zero_population_is_undefined() {
        assert_eq!(
            percentage(&RecordStore::default(), PercentField::EthnicitiesWhite),
            None
        );

        let store = RecordStore::from_records(vec![uniform("Ghost", "S", 40.0, 0)]);
        assert_eq!(percentage(&store, PercentField::EthnicitiesWhite), None);
    }

    #[test]
    fn ge_and_le_partition_integer_valued_data() {
        let store = RecordStore::from_records(
            (0..40)
                .map(|i| uniform(&format!("C{i}"), "S", f64::from(i % 20), 10))
                .collect(),
        );

        for v in 0..=20 {
            let threshold = f64::from(v);
            let at_or_above = count_matching(
                &store,
                PercentField::IncomeBelowPoverty,
                Comparison::Ge,
                threshold,
            );
            let below = count_matching(
                &store,
                PercentField::IncomeBelowPoverty,
                Comparison::Le,
                threshold - 1.0,
            );
            assert_eq!(at_or_above + below, store.count(), "threshold {v}");
        }
    }

    #[test]
    fn comparisons_are_inclusive() {
        let store = scenario();
        assert_eq!(
            count_matching(
                &store,
                PercentField::EducationHighSchool,
                Comparison::Ge,
                95.0
            ),
            1
        );
        assert_eq!(
            count_matching(
                &store,
                PercentField::EducationHighSchool,
                Comparison::Le,
                95.0
            ),
            2
        );
        assert_eq!(
            count_matching(
                &store,
                PercentField::EducationHighSchool,
                Comparison::Le,
                89.99
            ),
            0
        );
    }
}
