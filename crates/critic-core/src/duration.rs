//! Build durations as printed in the Maven reactor summary.
//!
//! Maven prints per-module build times in one of two shapes:
//!
//! | Shape        | Example      | Used for            |
//! |--------------|--------------|---------------------|
//! | `MM:SS min`  | `03:07 min`  | one minute or more  |
//! | `S.sss s`    | `0.980 s`    | under one minute    |
//!
//! Anything else (hours, a missing fraction, an empty token) is unparseable
//! and yields `None`; the resolver turns that into a fatal error.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

static MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+):([0-9]+)").unwrap_or_else(|e| unreachable!("minutes pattern: {e}"))
});

static SECONDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)\.([0-9]+)").unwrap_or_else(|e| unreachable!("seconds pattern: {e}"))
});

const NANOS_DIGITS: usize = 9;

/// Parse a reactor summary duration token.
///
/// Returns `None` for any token that is not `MM:SS min` or `S.sss s`.
#[must_use]
pub fn parse_build_duration(raw: &str) -> Option<Duration> {
    if raw.contains("min") {
        let caps = MINUTES.captures(raw)?;
        let minutes: u64 = caps[1].parse().ok()?;
        let seconds: u64 = caps[2].parse().ok()?;
        let total = minutes.checked_mul(60)?.checked_add(seconds)?;
        return Some(Duration::from_secs(total));
    }

    if raw.contains('s') {
        let caps = SECONDS.captures(raw)?;
        let seconds: u64 = caps[1].parse().ok()?;
        let nanos = fraction_to_nanos(&caps[2])?;
        return Some(Duration::new(seconds, nanos));
    }

    None
}

/// Render a duration the way the reactor summary prints it.
#[must_use]
pub fn format_build_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{:02}:{:02} min", secs / 60, secs % 60)
    } else {
        format!("{secs}.{:03} s", duration.subsec_millis())
    }
}

/// Convert the digits after the decimal point into nanoseconds.
///
/// Digits beyond nanosecond precision are dropped.
fn fraction_to_nanos(digits: &str) -> Option<u32> {
    let kept = digits.get(..digits.len().min(NANOS_DIGITS))?;
    let padded = format!("{kept:0<width$}", width = NANOS_DIGITS);
    padded.parse().ok()
}
