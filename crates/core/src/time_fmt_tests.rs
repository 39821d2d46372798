// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{format_elapsed, format_elapsed_ms, format_epoch_local};

#[yare::parameterized(
    zero_seconds     = { 0,      "0s" },
    max_seconds      = { 59,     "59s" },
    one_minute       = { 60,     "1m" },
    max_minutes      = { 3599,   "59m" },
    one_hour         = { 3600,   "1h" },
    hour_and_minutes = { 3660,   "1h1m" },
    almost_a_day     = { 86399,  "23h59m" },
    two_days         = { 172800, "2d" },
)]
fn elapsed(secs: u64, expected: &str) {
    assert_eq!(format_elapsed(secs), expected);
}

#[yare::parameterized(
    five_seconds = { 5_000,     "5s" },
    two_minutes  = { 120_000,   "2m" },
    one_hour     = { 3_600_000, "1h" },
)]
fn elapsed_ms(ms: u64, expected: &str) {
    assert_eq!(format_elapsed_ms(ms), expected);
}

#[test]
fn epoch_local_has_date_and_time_parts() {
    let s = format_epoch_local(1_769_760_849_000);
    assert_eq!(s.len(), "2026-01-30 08:14:09".len());
    assert!(s.starts_with("2026-01-"));
}

#[test]
fn out_of_range_epoch_falls_back_to_number() {
    assert_eq!(format_epoch_local(u64::MAX), u64::MAX.to_string());
}
