// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    seconds = { "30s", Duration::from_secs(30) },
    minutes = { "5m", Duration::from_secs(300) },
    hours = { "2h", Duration::from_secs(7200) },
    days = { "2d", Duration::from_secs(48 * 3600) },
    compound = { "1h30m", Duration::from_secs(90 * 60) },
)]
fn parses_valid_durations(input: &str, expected: Duration) {
    assert_eq!(parse_duration(input).unwrap(), expected);
}

#[test]
fn rejects_negative_duration() {
    assert!(parse_duration("-1d").is_err());
}

#[test]
fn rejects_bare_number_with_no_unit() {
    assert!(parse_duration("10").is_err());
}

#[test]
fn rejects_unknown_unit() {
    assert!(parse_duration("2days").is_err());
}

#[test]
fn rejects_empty_string() {
    assert_eq!(parse_duration(""), Err(DurationParseError::Empty));
}
