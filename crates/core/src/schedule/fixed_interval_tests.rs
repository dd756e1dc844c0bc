// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::time::Duration;
use yare::parameterized;

const MINUTE: Duration = Duration::from_secs(60);

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// 2026-01-05 is a Monday
fn monday(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap().and_time(time(h, m))
}

fn saturday(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 10).unwrap().and_time(time(h, m))
}

fn every(minutes: u64) -> FixedInterval {
    FixedInterval::new(FixedIntervalConfig::new(MINUTE * minutes as u32))
}

fn plus(at: NaiveDateTime, d: Duration) -> NaiveDateTime {
    at + chrono::Duration::from_std(d).unwrap()
}

#[test]
fn never_fired_schedule_is_due_immediately() {
    let schedule = every(10);
    assert!(schedule.is_due(monday(9, 0)));
}

#[test]
fn poll_marks_fired_and_blocks_until_interval_elapsed() {
    let mut schedule = every(10);
    let start = monday(9, 0);

    assert!(schedule.poll(start));
    assert_eq!(schedule.last_fired(), Some(start));
    assert!(!schedule.poll(start), "no double fire within one tick");
    assert!(!schedule.is_due(plus(start, MINUTE * 9)));
    assert!(schedule.is_due(plus(start, MINUTE * 10)));
}

#[test]
fn is_due_has_no_side_effects() {
    let schedule = every(10);
    let now = monday(9, 0);
    assert!(schedule.is_due(now));
    assert!(schedule.is_due(now));
    assert!(schedule.last_fired().is_none());
}

#[test]
fn late_poll_fires_once_not_once_per_missed_tick() {
    let mut schedule = every(1);
    let start = monday(9, 0);
    assert!(schedule.poll(start));

    // Heartbeats stalled for ten minutes
    let late = plus(start, MINUTE * 10);
    assert!(schedule.poll(late));
    assert!(!schedule.poll(late));
    assert!(!schedule.poll(plus(late, Duration::from_secs(30))));
    assert!(schedule.poll(plus(late, MINUTE)));
}

#[test]
fn zero_frequency_never_fires() {
    let mut schedule = every(0);
    assert!(!schedule.poll(monday(9, 0)));
}

#[test]
fn excluded_day_never_fires() {
    let config = FixedIntervalConfig::new(MINUTE).on(DaysOfWeek::WEEKDAYS);
    let mut schedule = FixedInterval::new(config);
    assert!(!schedule.poll(saturday(12, 0)));
    assert!(schedule.poll(monday(12, 0)));
}

#[parameterized(
    before_start = { 7, 59, false },
    at_start = { 8, 0, true },
    middle = { 12, 0, true },
    just_before_end = { 17, 59, true },
    at_end_exclusive = { 18, 0, false },
    evening = { 21, 0, false },
)]
fn plain_window(h: u32, m: u32, due: bool) {
    let config = FixedIntervalConfig::new(MINUTE).between(time(8, 0), time(18, 0));
    let schedule = FixedInterval::new(config);
    assert_eq!(schedule.is_due(monday(h, m)), due);
}

#[parameterized(
    late_evening = { 23, 30, true },
    at_start = { 22, 0, true },
    after_midnight = { 1, 30, true },
    at_end_exclusive = { 2, 0, false },
    noon = { 12, 0, false },
)]
fn wrapping_window(h: u32, m: u32, due: bool) {
    let config = FixedIntervalConfig::new(MINUTE).between(time(22, 0), time(2, 0));
    let schedule = FixedInterval::new(config);
    assert_eq!(schedule.is_due(monday(h, m)), due);
}

#[test]
fn default_window_is_all_day() {
    let window = TimeWindow::all_day();
    assert!(window.contains(time(0, 0)));
    assert!(window.contains(time(23, 59)));
    assert!(window.contains(NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap()));
    assert_eq!(window.to_string(), "all day");
}

#[test]
fn open_ended_window_runs_to_midnight() {
    let window = TimeWindow::from_start(time(20, 0));
    assert!(!window.contains(time(19, 59)));
    assert!(window.contains(time(20, 0)));
    assert!(window.contains(time(23, 59)));
    assert!(!window.contains(time(0, 0)));
    assert_eq!(window.to_string(), "from 20:00:00");
}

#[parameterized(
    midnight = { 0, 0 },
    at_start = { 9, 0 },
    afternoon = { 14, 0 },
    late = { 23, 59 },
)]
fn equal_start_and_end_is_empty(h: u32, m: u32) {
    let config = FixedIntervalConfig::new(MINUTE * 10).between(time(9, 0), time(9, 0));
    let mut schedule = FixedInterval::new(config);
    assert!(!schedule.poll(monday(h, m)));
    assert_eq!(schedule.config().window().to_string(), "09:00:00-09:00:00");
}

#[test]
fn reschedule_shortens_next_wait_once() {
    let mut schedule = every(60);
    let start = monday(9, 0);
    assert!(schedule.poll(start));

    schedule.request_reschedule(Duration::from_secs(20));
    assert_eq!(schedule.wait(), Duration::from_secs(20));
    assert!(!schedule.is_due(plus(start, Duration::from_secs(19))));

    let retry = plus(start, Duration::from_secs(20));
    assert!(schedule.poll(retry));

    // Consumed: back to the configured cadence
    assert!(schedule.pending_delay().is_none());
    assert!(!schedule.is_due(plus(retry, Duration::from_secs(20))));
    assert!(schedule.is_due(plus(retry, MINUTE * 60)));
}

#[test]
fn reschedule_never_lengthens_wait() {
    let mut schedule = every(10);
    let start = monday(9, 0);
    assert!(schedule.poll(start));

    schedule.request_reschedule(MINUTE * 30);
    assert_eq!(schedule.pending_delay(), None);
    assert_eq!(schedule.wait(), MINUTE * 10);
    assert!(schedule.is_due(plus(start, MINUTE * 10)));
}

#[test]
fn zero_reschedule_keeps_configured_wait() {
    let mut schedule = every(10);
    let start = monday(9, 0);
    assert!(schedule.poll(start));

    schedule.request_reschedule(Duration::ZERO);
    assert_eq!(schedule.pending_delay(), None);
    assert_eq!(schedule.wait(), MINUTE * 10);
    assert!(!schedule.poll(start));
    assert!(!schedule.poll(plus(start, MINUTE * 9)));
    assert!(schedule.poll(plus(start, MINUTE * 10)));
}

#[test]
fn zero_reschedule_leaves_earlier_request_in_place() {
    let mut schedule = every(10);
    assert!(schedule.poll(monday(9, 0)));

    schedule.request_reschedule(MINUTE * 2);
    schedule.request_reschedule(Duration::ZERO);
    assert_eq!(schedule.pending_delay(), Some(MINUTE * 2));
}

#[test]
fn repeated_reschedule_requests_keep_the_shortest() {
    let mut schedule = every(10);
    assert!(schedule.poll(monday(9, 0)));

    schedule.request_reschedule(MINUTE * 2);
    schedule.request_reschedule(MINUTE * 5);
    assert_eq!(schedule.pending_delay(), Some(MINUTE * 2));
}

#[test]
fn reschedule_does_not_bypass_window() {
    let config = FixedIntervalConfig::new(MINUTE * 60).between(time(8, 0), time(9, 0));
    let mut schedule = FixedInterval::new(config);
    assert!(schedule.poll(monday(8, 59)));

    schedule.request_reschedule(Duration::from_secs(30));
    assert!(!schedule.is_due(monday(9, 0)));
}

#[test]
fn spec_builds_fixed_interval_from_toml() {
    let spec: ScheduleSpec = toml::from_str(
        r#"
        kind = "fixed_interval"
        every = "5m"
        days = "weekdays"
        start = "22:00"
        end = "02:00:00"
        "#,
    )
    .unwrap();

    let ScheduleSpec::FixedInterval(config) = &spec;
    assert_eq!(config.every, MINUTE * 5);
    assert_eq!(config.days, DaysOfWeek::WEEKDAYS);
    assert_eq!(config.window(), TimeWindow::new(time(22, 0), time(2, 0)));

    let schedule = spec.build();
    assert!(schedule.is_due(monday(23, 0)));
    assert!(!schedule.is_due(saturday(23, 0)));
    assert!(schedule.describe().starts_with("every 5m"));
}

#[test]
fn spec_defaults_to_every_day_all_day() {
    let spec: ScheduleSpec = toml::from_str(
        r#"
        kind = "fixed_interval"
        every = "30s"
        "#,
    )
    .unwrap();
    let ScheduleSpec::FixedInterval(config) = spec;
    assert_eq!(config.days, DaysOfWeek::EVERYDAY);
    assert_eq!(config.end, None);
    assert_eq!(config.window(), TimeWindow::all_day());
}
