//! Parsing helpers for computed style values
//!
//! Hosts report computed styles as raw CSS strings; these turn them into
//! the numbers the engine works with.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?[0-9]+(?:\.[0-9]+)?").expect("BUG: invalid NUMBER_RE regex literal")
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9.]+)([ms]{1,2})").expect("BUG: invalid DURATION_RE regex literal")
});

/// Parse the first number found in a string, e.g. `"10px"` -> `10.0`.
/// Returns 0 when the string holds no number.
pub fn parse_number(value: &str) -> f64 {
    NUMBER_RE
        .find(value)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

/// Parse a CSS transition duration such as `"0.3s"` or `"250ms, 1s"`.
///
/// Only the first duration in a list is used. Unparseable input yields zero.
pub fn parse_duration(value: &str) -> Duration {
    let Some(caps) = DURATION_RE.captures(value) else {
        return Duration::ZERO;
    };
    let Ok(amount) = caps[1].parse::<f64>() else {
        return Duration::ZERO;
    };

    let millis = if &caps[2] == "s" { amount * 1000.0 } else { amount };
    Duration::from_millis(millis.trunc() as u64)
}
