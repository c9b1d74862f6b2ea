//! Unit tests for the business-hours window configuration.

use chrono::{NaiveTime, TimeZone, Utc, Weekday};

use tenant_comms_governor::scheduler::business_hours::BusinessHours;
use tenant_comms_governor::AppError;

#[derive(serde::Deserialize)]
struct Wrapper {
    business_hours: BusinessHours,
}

#[test]
fn parses_from_toml() {
    let raw = r#"
        [business_hours]
        start = "08:30:00"
        end = "18:00:00"
        days = ["Mon", "Tue", "Sat"]
        utc_offset_minutes = 60
    "#;
    let parsed: Wrapper = toml::from_str(raw).expect("parse");
    let hours = parsed.business_hours;
    assert_eq!(hours.start, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    assert_eq!(hours.days, vec![Weekday::Mon, Weekday::Tue, Weekday::Sat]);
    assert_eq!(hours.utc_offset_minutes, 60);
    hours.validate().expect("valid");
}

#[test]
fn missing_fields_take_defaults() {
    let parsed: Wrapper = toml::from_str("[business_hours]\n").expect("parse");
    assert_eq!(parsed.business_hours, BusinessHours::default());
}

#[test]
fn saturday_window_opens_on_saturday() {
    let hours = BusinessHours {
        days: vec![Weekday::Sat],
        ..BusinessHours::default()
    };
    // 2026-10-14 is a Wednesday; the next Saturday is 2026-10-17.
    let wednesday = Utc.with_ymd_and_hms(2026, 10, 14, 10, 0, 0).unwrap();
    assert!(!hours.is_open(wednesday));
    assert_eq!(
        hours.next_open(wednesday),
        Some(Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap())
    );
}

#[test]
fn open_instant_is_its_own_next_open() {
    let hours = BusinessHours::default();
    let at = Utc.with_ymd_and_hms(2026, 10, 14, 11, 15, 0).unwrap();
    assert_eq!(hours.next_open(at), Some(at));
}

#[test]
fn empty_days_are_rejected() {
    let hours = BusinessHours {
        days: Vec::new(),
        ..BusinessHours::default()
    };
    assert!(matches!(hours.validate(), Err(AppError::Config(_))));
}

#[test]
fn out_of_range_offset_is_rejected_and_closed() {
    let hours = BusinessHours {
        utc_offset_minutes: 24 * 60,
        ..BusinessHours::default()
    };
    assert!(matches!(hours.validate(), Err(AppError::Config(_))));
    let at = Utc.with_ymd_and_hms(2026, 10, 14, 11, 0, 0).unwrap();
    assert!(!hours.is_open(at));
    assert_eq!(hours.next_open(at), None);
}
