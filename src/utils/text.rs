use chrono::{Datelike, Local, NaiveDateTime, Timelike};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English month name for a 1-based month number.
///
/// Month names are always English regardless of process locale; formatting
/// must never mutate global locale state.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[month.clamp(1, 12) as usize - 1]
}

/// "January 2025" style period label.
pub fn month_year_label(year: i32, month: u32) -> String {
    format!("{} {}", month_name(month), year)
}

/// Parse a `YYYY-MM` period input. Unparsable or out-of-range input falls
/// back to the current system month rather than failing the request.
pub fn parse_month_year(input: Option<&str>) -> (i32, u32) {
    let today = Local::now().date_naive();
    let fallback = (today.year(), today.month());

    let Some(raw) = input else { return fallback };

    let mut parts = raw.trim().splitn(2, '-');
    let year = parts.next().and_then(|p| p.parse::<i32>().ok());
    let month = parts.next().and_then(|p| p.parse::<u32>().ok());

    match (year, month) {
        (Some(y), Some(m)) if (1..=12).contains(&m) && (1900..=9999).contains(&y) => (y, m),
        _ => fallback,
    }
}

/// 12-hour lowercase display time, e.g. "08:03am". This is the form shown
/// in timetable cells and the key used to collapse duplicate punches.
pub fn format_clock_time(t: &NaiveDateTime) -> String {
    let (is_pm, hour12) = t.hour12();
    format!(
        "{:02}:{:02}{}",
        hour12,
        t.minute(),
        if is_pm { "pm" } else { "am" }
    )
}

/// True if the string contains a CJK Unified Ideograph (U+4E00..U+9FFF).
///
/// Deliberately a plain code-point range test, not script detection: it
/// will misclassify other wide scripts if any are ever introduced. Used
/// only to pick the registered CJK font face over the Latin default.
pub fn has_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn month_names_are_english() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_year_label(2025, 4), "April 2025");
    }

    #[test]
    fn out_of_range_months_clamp_instead_of_panicking() {
        assert_eq!(month_name(0), "January");
        assert_eq!(month_name(13), "December");
    }

    #[test]
    fn parse_month_year_accepts_valid_input() {
        assert_eq!(parse_month_year(Some("2025-01")), (2025, 1));
        assert_eq!(parse_month_year(Some("2024-12")), (2024, 12));
    }

    #[test]
    fn parse_month_year_falls_back_to_current_month() {
        let today = Local::now().date_naive();
        let expected = (today.year(), today.month());
        assert_eq!(parse_month_year(None), expected);
        assert_eq!(parse_month_year(Some("not-a-date")), expected);
        assert_eq!(parse_month_year(Some("2025-13")), expected);
        assert_eq!(parse_month_year(Some("2025")), expected);
        assert_eq!(parse_month_year(Some("")), expected);
    }

    #[test]
    fn clock_time_is_twelve_hour_lowercase() {
        let t = NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(8, 3, 0)
            .unwrap();
        assert_eq!(format_clock_time(&t), "08:03am");

        let t = NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(17, 45, 59)
            .unwrap();
        assert_eq!(format_clock_time(&t), "05:45pm");

        let midnight = NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_clock_time(&midnight), "12:00am");
    }

    #[test]
    fn cjk_detection_is_a_range_test() {
        assert!(has_cjk("例"));
        assert!(has_cjk("陳大文 Chan Tai Man"));
        assert!(!has_cjk("Chan Tai Man"));
        assert!(!has_cjk(""));
        // Full-width Latin is outside the tested range by design
        assert!(!has_cjk("ＡＢＣ"));
    }
}
