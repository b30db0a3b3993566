use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Orders two operands: numerically if both parse as numbers, else
/// chronologically if both parse as dates, else by case-insensitive text.
///
/// When only one side parses as a number (or, failing that, as a date) the
/// operands are not comparable and `None` is returned. Such mixed pairs are
/// never compared as text, so `age > 18` with `age = "bob"` stays unknown
/// instead of ordering "bob" after "18".
pub fn compare_operands(left: &str, right: &str) -> Option<Ordering> {
    let (left, right) = (left.trim(), right.trim());

    match (parse_number(left), parse_number(right)) {
        (Some(l), Some(r)) => return l.partial_cmp(&r),
        (Some(_), None) | (None, Some(_)) => return None,
        (None, None) => {}
    }

    match (parse_date(left), parse_date(right)) {
        (Some(l), Some(r)) => Some(l.cmp(&r)),
        (Some(_), None) | (None, Some(_)) => None,
        (None, None) => Some(left.to_lowercase().cmp(&right.to_lowercase())),
    }
}

pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parses the date and datetime shapes found in workflow documents and in
/// the `today` / `now` variables.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
