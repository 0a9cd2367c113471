use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// `chrono` format string for stored task dates.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Last year that still fits the four-digit year of `YYYYMMDD`.
pub const MAX_DATE_YEAR: i32 = 9999;

// chrono accepts single-digit months/days for `%m`/`%d`; stored dates are fixed width.
static DATE_SHAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8}$").expect("valid date regex"));

/// Parses a `YYYYMMDD` string into a calendar date.
///
/// Returns `None` for anything that is not exactly eight digits or does not
/// name a real calendar day (`20230229`, `20241301`, ...).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if !DATE_SHAPE_RE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Formats a calendar date as `YYYYMMDD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_date, parse_date};
    use chrono::NaiveDate;

    #[test]
    fn parse_date_accepts_fixed_width_calendar_dates() {
        assert_eq!(
            parse_date("20240229"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(parse_date("00010101"), NaiveDate::from_ymd_opt(1, 1, 1));
    }

    #[test]
    fn parse_date_rejects_malformed_values() {
        for value in [
            "", "2024031", "202403100", "2024-03-10", "20230229", "20241301", "20240100",
            " 20240310", "2024031a",
        ] {
            assert!(parse_date(value).is_none(), "`{value}` should be rejected");
        }
    }

    #[test]
    fn format_date_pads_components() {
        let date = NaiveDate::from_ymd_opt(987, 3, 4).expect("valid date");
        assert_eq!(format_date(date), "09870304");
    }
}
