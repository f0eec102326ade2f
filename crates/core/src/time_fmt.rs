// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Duration string parsing shared by the CLI and the event service's
//! search filters (spec §4.N).
//!
//! Accepts the usual `Ns`/`Nm`/`Nh` forms, a `Nd` (days) suffix meaning
//! `N*24h`, and compound forms like `1h30m`.

use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("empty duration string")]
    Empty,
    #[error("invalid duration: {0}")]
    Invalid(String),
    #[error("negative durations are not allowed: {0}")]
    Negative(String),
}

/// Parse a compound duration string such as `"2d"`, `"90m"`, `"1h30m"`.
///
/// Each segment is a non-negative integer followed by one of `s`, `m`,
/// `h`, `d`. Segments may repeat a unit (the values accumulate). A bare
/// number with no unit, a leading `-`, or any non-digit/non-unit
/// character is rejected.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if let Some(rest) = input.strip_prefix('-') {
        return Err(DurationParseError::Negative(rest.to_string()));
    }

    let mut total = Duration::ZERO;
    let mut digits = String::new();
    let mut saw_segment = false;

    for ch in input.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        if digits.is_empty() {
            return Err(DurationParseError::Invalid(input.to_string()));
        }
        let n: u64 = digits
            .parse()
            .map_err(|_| DurationParseError::Invalid(input.to_string()))?;
        digits.clear();

        let secs = match ch {
            's' => n,
            'm' => n * 60,
            'h' => n * 3600,
            'd' => n * 86400,
            _ => return Err(DurationParseError::Invalid(input.to_string())),
        };
        total += Duration::from_secs(secs);
        saw_segment = true;
    }

    if !digits.is_empty() || !saw_segment {
        // Trailing digits with no unit (e.g. "10") or nothing matched at all.
        return Err(DurationParseError::Invalid(input.to_string()));
    }

    Ok(total)
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
