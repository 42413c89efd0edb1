//! Timestamp parsing, generation, and validation tests.

use framepress::FramepressError;
use framepress::timestamps::{
    interval_timestamps, parse_timecode, parse_timecode_list, validate,
};

// ── Parsing ────────────────────────────────────────────────────────

#[test]
fn parse_plain_seconds() {
    assert_eq!(parse_timecode("75").unwrap(), 75.0);
    assert_eq!(parse_timecode("12.5").unwrap(), 12.5);
    assert_eq!(parse_timecode(" 3 ").unwrap(), 3.0);
}

#[test]
fn parse_minutes_seconds() {
    assert_eq!(parse_timecode("1:15").unwrap(), 75.0);
    assert_eq!(parse_timecode("01:15.5").unwrap(), 75.5);
}

#[test]
fn parse_hours_minutes_seconds() {
    assert_eq!(parse_timecode("0:01:15").unwrap(), 75.0);
    assert_eq!(parse_timecode("2:00:30").unwrap(), 7230.0);
}

#[test]
fn parse_rejects_garbage() {
    for input in ["", "abc", "1:2:3:4", "-5", "1:-20", "::"] {
        match parse_timecode(input) {
            Err(FramepressError::InvalidTimecode(_)) => {}
            other => panic!("Expected InvalidTimecode for {input:?}, got: {other:?}"),
        }
    }
}

#[test]
fn parse_list_comma_separated() {
    let stamps = parse_timecode_list("10, 1:15, 0:02:45").unwrap();
    assert_eq!(stamps, vec![10.0, 75.0, 165.0]);
}

#[test]
fn parse_list_fails_on_first_bad_entry() {
    assert!(parse_timecode_list("10, nope, 20").is_err());
}

// ── Interval generation ────────────────────────────────────────────

#[test]
fn interval_thirty_over_ninety_five() {
    let stamps = interval_timestamps(95.0, 30.0).unwrap();
    assert_eq!(stamps, vec![0.0, 30.0, 60.0, 90.0]);
}

#[test]
fn interval_includes_exact_duration() {
    let stamps = interval_timestamps(90.0, 30.0).unwrap();
    assert_eq!(stamps, vec![0.0, 30.0, 60.0, 90.0]);
}

#[test]
fn interval_zero_duration_yields_origin() {
    let stamps = interval_timestamps(0.0, 30.0).unwrap();
    assert_eq!(stamps, vec![0.0]);
}

#[test]
fn interval_must_be_positive() {
    for interval in [0.0, -1.0] {
        match interval_timestamps(100.0, interval) {
            Err(FramepressError::InvalidInterval) => {}
            other => panic!("Expected InvalidInterval, got: {other:?}"),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────────

#[test]
fn validate_drops_out_of_range_entries() {
    // duration=120, requested=[10,130,60]: 130 is dropped, order ascending.
    let plan = validate(&[10.0, 130.0, 60.0], 120.0).unwrap();
    assert_eq!(plan.timestamps, vec![10.0, 60.0]);
    assert_eq!(plan.dropped, 1);
}

#[test]
fn validate_sorts_ascending() {
    let plan = validate(&[90.0, 10.0, 45.0], 120.0).unwrap();
    assert_eq!(plan.timestamps, vec![10.0, 45.0, 90.0]);
    assert_eq!(plan.dropped, 0);
}

#[test]
fn validate_output_is_bounded_subset() {
    let requested = [0.0, -3.0, 17.2, 120.0, 120.1, 500.0];
    let plan = validate(&requested, 120.0).unwrap();

    for timestamp in &plan.timestamps {
        assert!(*timestamp >= 0.0 && *timestamp <= 120.0);
        assert!(requested.contains(timestamp), "not a subset: {timestamp}");
    }
    for window in plan.timestamps.windows(2) {
        assert!(window[0] <= window[1], "not ascending");
    }
    assert_eq!(plan.dropped, 3);
}

#[test]
fn validate_boundaries_are_inclusive() {
    let plan = validate(&[0.0, 120.0], 120.0).unwrap();
    assert_eq!(plan.timestamps, vec![0.0, 120.0]);
}

#[test]
fn validate_negative_entries_are_dropped_not_clamped() {
    let plan = validate(&[-1.0, 10.0], 120.0).unwrap();
    assert_eq!(plan.timestamps, vec![10.0]);
    assert_eq!(plan.dropped, 1);
}

#[test]
fn validate_empty_result_is_an_error() {
    match validate(&[200.0, 300.0], 120.0) {
        Err(FramepressError::NoValidTimestamps {
            requested,
            duration_seconds,
        }) => {
            assert_eq!(requested, 2);
            assert_eq!(duration_seconds, 120.0);
        }
        other => panic!("Expected NoValidTimestamps, got: {other:?}"),
    }
}

#[test]
fn validate_keeps_duplicates() {
    let plan = validate(&[10.0, 10.0], 120.0).unwrap();
    assert_eq!(plan.timestamps, vec![10.0, 10.0]);
}
