//! Release-window policies.
//!
//! How a release option encodes the dates it covers is a convention of each
//! board, so the mapping is pluggable. Policies never guess: an option whose
//! name does not follow the convention is simply not a candidate.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::SingleSelectOption;

/// Maps a due date to a release option.
pub trait ReleasePolicy: Send + Sync {
    /// Short name used in logs and on the command line.
    fn name(&self) -> &'static str;

    fn select<'a>(
        &self,
        candidates: &'a [SingleSelectOption],
        date: NaiveDate,
    ) -> Option<&'a SingleSelectOption>;
}

fn iso_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("ISO date pattern is valid"))
}

/// ISO dates (`YYYY-MM-DD`) found in `text`, in order of appearance.
/// Substrings that look like dates but are not valid calendar days are skipped.
pub(crate) fn embedded_dates(text: &str) -> Vec<NaiveDate> {
    iso_date_pattern()
        .find_iter(text)
        .filter_map(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
        .collect()
}

/// Default policy: the option name carries its window as two ISO dates,
/// e.g. `v2.3 (2024-03-04 - 2024-03-29)`. Both ends are inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRangeInName;

impl ReleasePolicy for DateRangeInName {
    fn name(&self) -> &'static str {
        "date-range"
    }

    fn select<'a>(
        &self,
        candidates: &'a [SingleSelectOption],
        date: NaiveDate,
    ) -> Option<&'a SingleSelectOption> {
        candidates.iter().find(|opt| {
            let dates = embedded_dates(&opt.name);
            match dates.as_slice() {
                [start, end, ..] => {
                    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
                    *lo <= date && date <= *hi
                }
                _ => false,
            }
        })
    }
}

/// The option name carries a single release date, e.g. `2024-03-29 release`.
/// Picks the earliest release on or after the due date; ties go to catalog order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NextReleaseOnOrAfter;

impl ReleasePolicy for NextReleaseOnOrAfter {
    fn name(&self) -> &'static str {
        "next-release"
    }

    fn select<'a>(
        &self,
        candidates: &'a [SingleSelectOption],
        date: NaiveDate,
    ) -> Option<&'a SingleSelectOption> {
        let mut best: Option<(NaiveDate, &'a SingleSelectOption)> = None;
        for opt in candidates {
            let Some(released) = embedded_dates(&opt.name).first().copied() else {
                continue;
            };
            if released < date {
                continue;
            }
            match best {
                Some((current, _)) if current <= released => {}
                _ => best = Some((released, opt)),
            }
        }
        best.map(|(_, opt)| opt)
    }
}

/// Release derivation disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRelease;

impl ReleasePolicy for NoRelease {
    fn name(&self) -> &'static str {
        "none"
    }

    fn select<'a>(
        &self,
        _candidates: &'a [SingleSelectOption],
        _date: NaiveDate,
    ) -> Option<&'a SingleSelectOption> {
        None
    }
}
