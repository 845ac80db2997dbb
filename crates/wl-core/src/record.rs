//! Normalized worklog records.

use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// A single worklog, normalized by the extractor.
///
/// `day_of_month` is already expressed in the viewer's local calendar and the
/// record is known to lie inside the reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogRecord {
    /// Issue key, e.g. `PROJ-123`.
    pub issue_key: String,

    /// Issue summary shown next to the key in reports.
    pub summary: String,

    /// Local calendar day the work was started on (1-based).
    pub day_of_month: u32,

    /// Logged duration in seconds.
    pub seconds_spent: i64,
}

impl WorklogRecord {
    pub fn new(
        issue_key: impl Into<String>,
        summary: impl Into<String>,
        day_of_month: u32,
        seconds_spent: i64,
    ) -> Self {
        Self {
            issue_key: issue_key.into(),
            summary: summary.into(),
            day_of_month,
            seconds_spent,
        }
    }
}

/// Sums the logged time of all records, in seconds.
///
/// Returns `None` if the total does not fit in an `i64`.
pub fn total_seconds(records: &[WorklogRecord]) -> Option<i64> {
    records
        .iter()
        .try_fold(0_i64, |total, r| total.checked_add(r.seconds_spent))
}

/// Converts seconds to hours rounded to two decimal places.
#[allow(clippy::cast_precision_loss)]
pub fn seconds_to_hours(seconds: i64) -> f64 {
    round_hours(seconds as f64 / SECONDS_PER_HOUR)
}

/// Rounds an hour value to two decimal places.
///
/// The exact binary value of `hours` is rounded, so only values that sit
/// exactly halfway between two hundredths (such as `0.125`) are ties, and
/// ties go to the even hundredth. `0.015` is stored slightly below the
/// midpoint and rounds down.
#[allow(
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
pub fn round_hours(hours: f64) -> f64 {
    const FRACTION_BITS: u32 = 52;
    const FRACTION_MASK: u64 = (1 << FRACTION_BITS) - 1;
    const EXPONENT_BIAS: i64 = 1075;

    if !hours.is_finite() {
        return hours;
    }

    // hours = mantissa * 2^exponent exactly.
    let bits = hours.abs().to_bits();
    let biased = (bits >> FRACTION_BITS) as i64;
    let (mantissa, exponent) = if biased == 0 {
        (bits & FRACTION_MASK, 1 - EXPONENT_BIAS)
    } else {
        ((bits & FRACTION_MASK) | (1 << FRACTION_BITS), biased - EXPONENT_BIAS)
    };
    if exponent >= 0 {
        return hours;
    }

    // mantissa * 100 < 2^60, so any larger shift leaves less than half.
    let shift = exponent.unsigned_abs();
    let scaled = mantissa * 100;
    let hundredths = if shift > 61 {
        0
    } else {
        let quotient = scaled >> shift;
        let remainder = scaled & ((1 << shift) - 1);
        let half = 1 << (shift - 1);
        if remainder > half || (remainder == half && quotient % 2 == 1) {
            quotient + 1
        } else {
            quotient
        }
    };

    let rounded = hundredths as f64 / 100.0;
    if hours.is_sign_negative() { -rounded } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_to_hours_exact() {
        assert!((seconds_to_hours(5400) - 1.5).abs() < f64::EPSILON);
        assert!((seconds_to_hours(7200) - 2.0).abs() < f64::EPSILON);
        assert!(seconds_to_hours(0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_seconds_to_hours_rounds_to_two_places() {
        // 20 minutes = 0.3333.. hours
        assert!((seconds_to_hours(1200) - 0.33).abs() < 1e-9);
        // 40 minutes = 0.6666.. hours
        assert!((seconds_to_hours(2400) - 0.67).abs() < 1e-9);
        // 1 minute = 0.01666.. hours
        assert!((seconds_to_hours(60) - 0.02).abs() < 1e-9);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_exact_halves_round_to_even() {
        // 7m30s is exactly 0.125 hours.
        assert_eq!(seconds_to_hours(450), 0.12);
        // 22m30s is exactly 0.375 hours.
        assert_eq!(seconds_to_hours(1350), 0.38);
        // 37m30s is exactly 0.625 hours.
        assert_eq!(seconds_to_hours(2250), 0.62);
        assert_eq!(seconds_to_hours(5400), 1.5);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_near_halves_follow_stored_value() {
        // 54s is 0.015 hours, stored just below the midpoint.
        assert_eq!(seconds_to_hours(54), 0.01);
        assert_eq!(round_hours(0.015), 0.01);
        // 0.135 is stored just above the midpoint.
        assert_eq!(round_hours(0.135), 0.14);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_round_hours_edges() {
        assert_eq!(round_hours(0.0), 0.0);
        assert_eq!(round_hours(-0.125), -0.12);
        assert_eq!(round_hours(12.0), 12.0);
        assert_eq!(round_hours(1e-300), 0.0);
        assert!(round_hours(f64::NAN).is_nan());
    }

    #[test]
    fn test_total_seconds() {
        let records = vec![
            WorklogRecord::new("A-1", "Fix bug", 1, 3600),
            WorklogRecord::new("A-1", "Fix bug", 1, 1800),
            WorklogRecord::new("B-2", "Add feature", 2, 7200),
        ];
        assert_eq!(total_seconds(&records), Some(12_600));
        assert_eq!(total_seconds(&[]), Some(0));
    }

    #[test]
    fn test_total_seconds_overflow() {
        let records = vec![
            WorklogRecord::new("A-1", "Fix bug", 1, i64::MAX),
            WorklogRecord::new("A-1", "Fix bug", 2, 1),
        ];
        assert_eq!(total_seconds(&records), None);
    }

    #[test]
    fn test_record_json_uses_camel_case() {
        let json = r#"{"issueKey":"A-1","summary":"Fix bug","dayOfMonth":3,"secondsSpent":900}"#;
        let record: WorklogRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, WorklogRecord::new("A-1", "Fix bug", 3, 900));
        assert_eq!(serde_json::to_string(&record).unwrap(), json);
    }
}
