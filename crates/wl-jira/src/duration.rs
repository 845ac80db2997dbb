//! Jira "time spent" strings such as `1h 30m`.

use std::sync::LazyLock;

use regex::Regex;

use crate::JiraError;

/// One `<number><unit>` token.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)([smhdw])$").unwrap());

fn seconds_per_unit(unit: &str) -> Option<i64> {
    match unit {
        "s" => Some(1),
        "m" => Some(60),
        "h" => Some(3_600),
        "d" => Some(86_400),
        "w" => Some(604_800),
        _ => None,
    }
}

/// Parses a whitespace-separated duration like `1w 2d 3h 4m 5s` into seconds.
///
/// Days and weeks are calendar units (24h and 7d), not working days.
pub fn parse_time_spent(value: &str) -> Result<i64, JiraError> {
    let invalid = || JiraError::InvalidDuration {
        value: value.to_string(),
    };

    let mut total: i64 = 0;
    let mut tokens = 0;
    for token in value.split_whitespace() {
        let caps = TOKEN_RE.captures(token).ok_or_else(invalid)?;
        let amount: i64 = caps[1].parse().map_err(|_| invalid())?;
        let unit = seconds_per_unit(&caps[2]).ok_or_else(invalid)?;
        total = amount
            .checked_mul(unit)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or_else(invalid)?;
        tokens += 1;
    }

    if tokens == 0 {
        return Err(invalid());
    }
    Ok(total)
}
