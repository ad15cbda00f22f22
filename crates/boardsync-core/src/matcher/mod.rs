//! Catalog matching for derived fields.
//!
//! Pure functions from a scalar input (a due date, an estimate label) to the
//! single best catalog entry. `None` means "leave the field untouched" and
//! is never an error.

mod release;

use chrono::NaiveDate;

use crate::domain::{IterationOption, SingleSelectOption};

pub use release::{DateRangeInName, NextReleaseOnOrAfter, NoRelease, ReleasePolicy};

/// Iteration whose `[start_date, start_date + duration)` contains `date`.
///
/// Well-formed catalogs do not overlap; if they do, the first match in
/// catalog order wins.
pub fn find_week(candidates: &[IterationOption], date: NaiveDate) -> Option<&IterationOption> {
    candidates.iter().find(|it| it.contains(date))
}

/// Size option whose name equals the estimate label exactly (case-sensitive).
///
/// Relies on the board keeping "Estimate" and "Size" option names 1:1.
pub fn find_size<'a>(
    candidates: &'a [SingleSelectOption],
    estimate: &str,
) -> Option<&'a SingleSelectOption> {
    candidates.iter().find(|opt| opt.name == estimate)
}

/// Release option for `date`, as decided by `policy`.
pub fn find_release<'a>(
    policy: &dyn ReleasePolicy,
    candidates: &'a [SingleSelectOption],
    date: NaiveDate,
) -> Option<&'a SingleSelectOption> {
    policy.select(candidates, date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weeks() -> Vec<IterationOption> {
        vec![
            IterationOption::new("w1", "Week 1", date(2024, 3, 4), 14),
            IterationOption::new("w2", "Week 2", date(2024, 3, 18), 14),
        ]
    }

    #[test]
    fn test_week_contains_due_date() {
        let weeks = weeks();
        assert_eq!(find_week(&weeks, date(2024, 3, 10)).unwrap().id, "w1");
    }

    #[test]
    fn test_week_start_boundary_is_inclusive() {
        let weeks = weeks();
        assert_eq!(find_week(&weeks, date(2024, 3, 4)).unwrap().id, "w1");
    }

    #[test]
    fn test_week_end_boundary_belongs_to_next() {
        let weeks = weeks();
        assert_eq!(find_week(&weeks, date(2024, 3, 18)).unwrap().id, "w2");
    }

    #[test]
    fn test_week_outside_catalog() {
        let weeks = weeks();
        assert!(find_week(&weeks, date(2024, 4, 1)).is_none());
        assert!(find_week(&weeks, date(2024, 3, 3)).is_none());
        assert!(find_week(&[], date(2024, 3, 10)).is_none());
    }

    #[test]
    fn test_overlapping_weeks_first_wins() {
        let weeks = vec![
            IterationOption::new("late", "Late", date(2024, 3, 8), 7),
            IterationOption::new("early", "Early", date(2024, 3, 4), 14),
        ];
        assert_eq!(find_week(&weeks, date(2024, 3, 10)).unwrap().id, "late");
    }

    #[test]
    fn test_size_matches_estimate_names_one_to_one() {
        let sizes = vec![
            SingleSelectOption::new("s_xs", "XS"),
            SingleSelectOption::new("s_s", "S"),
            SingleSelectOption::new("s_m", "M"),
            SingleSelectOption::new("s_l", "L"),
            SingleSelectOption::new("s_xl", "XL"),
        ];
        for estimate in ["XS", "S", "M", "L", "XL"] {
            let size = find_size(&sizes, estimate).unwrap();
            assert_eq!(size.name, estimate);
        }
    }

    #[test]
    fn test_size_is_case_sensitive() {
        let sizes = vec![SingleSelectOption::new("s_m", "M")];
        assert!(find_size(&sizes, "m").is_none());
        assert!(find_size(&sizes, "M ").is_none());
        assert!(find_size(&sizes, "Medium").is_none());
    }

    #[test]
    fn test_release_delegates_to_policy() {
        let releases = vec![SingleSelectOption::new(
            "r1",
            "v1.0 (2024-03-01 - 2024-03-31)",
        )];
        let hit = find_release(&DateRangeInName, &releases, date(2024, 3, 10));
        assert_eq!(hit.unwrap().id, "r1");
        assert!(find_release(&NoRelease, &releases, date(2024, 3, 10)).is_none());
    }
}
