use chrono::{Datelike, NaiveDate};
use scheduler_core::{next_date, parse_date, RecurrenceError};

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn daily_rule_lands_on_step_multiple_after_reference() {
    let now = ymd(2024, 3, 10);
    let start = ymd(2023, 11, 17);

    for interval in [1_u32, 2, 5, 7, 30, 113, 400] {
        let result = next_date(now, "20231117", &format!("d {interval}")).unwrap();
        let next = parse_date(&result).unwrap();

        assert!(next > now, "d {interval}: {result} must be after {now}");
        let elapsed = (next - start).num_days();
        assert!(elapsed > 0);
        assert_eq!(elapsed % i64::from(interval), 0, "d {interval}");
        assert!(
            elapsed - i64::from(interval) <= (now - start).num_days(),
            "d {interval}: {result} skipped an earlier valid occurrence"
        );
    }
}

#[test]
fn weekly_interval_example_from_january() {
    assert_eq!(
        next_date(ymd(2024, 3, 10), "20240101", "d 7").unwrap(),
        "20240311"
    );
}

#[test]
fn daily_rule_advances_future_start_by_one_step() {
    assert_eq!(
        next_date(ymd(2024, 1, 1), "20240301", "d 5").unwrap(),
        "20240306"
    );
}

#[test]
fn reference_equal_to_candidate_is_not_accepted() {
    assert_eq!(
        next_date(ymd(2024, 3, 15), "20240310", "d 5").unwrap(),
        "20240320"
    );
}

#[test]
fn yearly_rule_keeps_month_and_day() {
    let now = ymd(2024, 3, 10);
    for start in ["20240301", "19990704", "20241225", "20200310"] {
        let result = next_date(now, start, "y").unwrap();
        let next = parse_date(&result).unwrap();
        let original = parse_date(start).unwrap();

        assert!(next > now);
        assert_eq!((next.month(), next.day()), (original.month(), original.day()));
    }

    assert_eq!(next_date(now, "20240301", "y").unwrap(), "20250301");
    assert_eq!(next_date(now, "20241225", "y").unwrap(), "20251225");
    assert_eq!(next_date(now, "20200310", "y").unwrap(), "20250310");
}

#[test]
fn yearly_rule_from_leap_day_rolls_to_march_first() {
    assert_eq!(
        next_date(ymd(2024, 3, 10), "20240229", "y").unwrap(),
        "20250301"
    );
    assert_eq!(
        next_date(ymd(2026, 6, 1), "20240229", "y").unwrap(),
        "20270301"
    );
}

#[test]
fn feeding_result_back_moves_at_least_one_step_further() {
    let now = ymd(2024, 3, 10);
    let first = next_date(now, "20240101", "d 7").unwrap();
    let second = next_date(now, &first, "d 7").unwrap();
    assert_eq!(first, "20240311");
    assert_eq!(second, "20240318");

    let first = next_date(now, "20200101", "y").unwrap();
    let second = next_date(now, &first, "y").unwrap();
    assert_eq!(first, "20250101");
    assert_eq!(second, "20260101");
}

#[test]
fn interval_boundaries() {
    let now = ymd(2024, 3, 10);
    assert!(next_date(now, "20240101", "d 1").is_ok());
    assert!(next_date(now, "20240101", "d 400").is_ok());

    for rule in ["d 0", "d 401", "d abc", "d ", "d 1.5", "d -1"] {
        assert!(
            matches!(
                next_date(now, "20240101", rule),
                Err(RecurrenceError::InvalidInterval(_))
            ),
            "`{rule}` should be an invalid interval"
        );
    }
}

#[test]
fn weekly_and_monthly_rules_are_unsupported() {
    let now = ymd(2024, 3, 10);
    for rule in ["w", "m"] {
        assert_eq!(
            next_date(now, "20240101", rule),
            Err(RecurrenceError::UnsupportedRule(rule.to_string()))
        );
    }
}

#[test]
fn unrecognized_rules_are_unknown() {
    let now = ymd(2024, 3, 10);
    for rule in ["x", "Y", "d", "w 1 2", "m 5", "yearly", " y"] {
        assert_eq!(
            next_date(now, "20240101", rule),
            Err(RecurrenceError::UnknownRule(rule.to_string())),
            "`{rule}` should be unknown"
        );
    }
}

#[test]
fn empty_rule_is_rejected_before_date_check() {
    assert_eq!(
        next_date(ymd(2024, 3, 10), "not-a-date", ""),
        Err(RecurrenceError::EmptyRule)
    );
}

#[test]
fn invalid_start_date_is_rejected_before_rule_check() {
    for date in ["", "2024-01-01", "20240230", "240101"] {
        assert_eq!(
            next_date(ymd(2024, 3, 10), date, "w"),
            Err(RecurrenceError::InvalidDate(date.to_string()))
        );
    }
}

#[test]
fn start_far_in_the_past_still_terminates() {
    assert_eq!(
        next_date(ymd(2024, 3, 10), "19000101", "d 1").unwrap(),
        "20240311"
    );
}

#[test]
fn rules_never_step_past_year_9999() {
    for repeat in ["y", "d 1", "d 400"] {
        assert_eq!(
            next_date(ymd(2024, 3, 10), "99991231", repeat),
            Err(RecurrenceError::DateOutOfRange),
            "rule `{repeat}`"
        );
    }
    assert_eq!(
        next_date(ymd(2024, 3, 10), "99981231", "y").unwrap(),
        "99991231"
    );
}
