use chrono::{Datelike, Duration, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

/// Holiday regions the provider knows about. Only Hong Kong is wired up;
/// the enum exists so callers never pass bare locale strings around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    HongKong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayCategory {
    Public,
    Optional,
}

#[derive(Debug, Clone, Copy)]
pub struct Holiday {
    pub name: &'static str,
    pub category: HolidayCategory,
}

use HolidayCategory::{Optional, Public};

const fn h(name: &'static str, category: HolidayCategory) -> Holiday {
    Holiday { name, category }
}

// Lunar-calendar-derived general holidays, observed dates (substitutes
// already applied). The solar-calendar rules cannot produce these, so
// they are tabulated per year; years outside the table simply omit them.
static LUNAR_2024: [(u32, u32, Holiday); 8] = [
    (2, 10, h("Lunar New Year's Day", Public)),
    (2, 12, h("The third day of Lunar New Year", Public)),
    (2, 13, h("The fourth day of Lunar New Year", Public)),
    (4, 4, h("Ching Ming Festival", Public)),
    (5, 15, h("The Birthday of the Buddha", Optional)),
    (6, 10, h("Tuen Ng Festival", Public)),
    (9, 18, h("The day following the Chinese Mid-Autumn Festival", Public)),
    (10, 11, h("Chung Yeung Festival", Public)),
];

static LUNAR_2025: [(u32, u32, Holiday); 8] = [
    (1, 29, h("Lunar New Year's Day", Public)),
    (1, 30, h("The second day of Lunar New Year", Public)),
    (1, 31, h("The third day of Lunar New Year", Public)),
    (4, 4, h("Ching Ming Festival", Public)),
    (5, 5, h("The Birthday of the Buddha", Optional)),
    (5, 31, h("Tuen Ng Festival", Public)),
    (10, 7, h("The day following the Chinese Mid-Autumn Festival", Public)),
    (10, 29, h("Chung Yeung Festival", Public)),
];

static LUNAR_2026: [(u32, u32, Holiday); 8] = [
    (2, 17, h("Lunar New Year's Day", Public)),
    (2, 18, h("The second day of Lunar New Year", Public)),
    (2, 19, h("The third day of Lunar New Year", Public)),
    (4, 7, h("Ching Ming Festival", Public)),
    (5, 25, h("The Birthday of the Buddha", Optional)),
    (6, 19, h("Tuen Ng Festival", Public)),
    (9, 26, h("The day following the Chinese Mid-Autumn Festival", Public)),
    (10, 19, h("Chung Yeung Festival", Public)),
];

static LUNAR_TABLE: Lazy<HashMap<i32, &'static [(u32, u32, Holiday)]>> = Lazy::new(|| {
    let mut m: HashMap<i32, &'static [(u32, u32, Holiday)]> = HashMap::new();
    m.insert(2024, &LUNAR_2024);
    m.insert(2025, &LUNAR_2025);
    m.insert(2026, &LUNAR_2026);
    m
});

/// Easter Sunday in the Gregorian calendar (Meeus/Jones/Butcher).
fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = ((h + l - 7 * m + 114) % 31) + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).expect("computus stays in range")
}

/// A fixed-date holiday moves to Monday when it falls on a Sunday.
fn observed(date: NaiveDate) -> (NaiveDate, bool) {
    if date.weekday() == Weekday::Sun {
        (date + Duration::days(1), true)
    } else {
        (date, false)
    }
}

/// Public/optional holidays for a year and region, keyed by date.
///
/// Purely computed from the built-in rules and the lunar table; no store
/// or network access. `categories` selects which kinds are included.
pub fn holidays_for(
    year: i32,
    region: Region,
    categories: &[HolidayCategory],
) -> BTreeMap<NaiveDate, Holiday> {
    let Region::HongKong = region;

    let mut out = BTreeMap::new();
    let mut add = |date: NaiveDate, holiday: Holiday| {
        if categories.contains(&holiday.category) {
            out.insert(date, holiday);
        }
    };
    let ymd = |m: u32, d: u32| NaiveDate::from_ymd_opt(year, m, d).expect("valid rule date");

    // Fixed-date holidays with Sunday substitution
    let fixed: [(u32, u32, &'static str, &'static str); 4] = [
        (
            1,
            1,
            "The first day of January",
            "The day following the first day of January",
        ),
        (5, 1, "Labour Day", "The day following Labour Day"),
        (
            7,
            1,
            "Hong Kong Special Administrative Region Establishment Day",
            "The day following Hong Kong Special Administrative Region Establishment Day",
        ),
        (10, 1, "National Day", "The day following National Day"),
    ];
    for (m, d, name, substituted_name) in fixed {
        let (date, moved) = observed(ymd(m, d));
        add(
            date,
            Holiday {
                name: if moved { substituted_name } else { name },
                category: Public,
            },
        );
    }

    // Easter cluster
    let easter = easter_sunday(year);
    add(
        easter - Duration::days(2),
        Holiday { name: "Good Friday", category: Optional },
    );
    add(
        easter - Duration::days(1),
        Holiday { name: "The day following Good Friday", category: Optional },
    );
    add(
        easter + Duration::days(1),
        Holiday { name: "Easter Monday", category: Optional },
    );

    // Christmas cluster: two days, shifted off Sunday as a pair
    let dec25 = ymd(12, 25);
    match dec25.weekday() {
        Weekday::Sun => {
            add(
                ymd(12, 26),
                Holiday { name: "The first weekday after Christmas Day", category: Public },
            );
            add(
                ymd(12, 27),
                Holiday { name: "The second weekday after Christmas Day", category: Public },
            );
        }
        Weekday::Sat => {
            add(dec25, Holiday { name: "Christmas Day", category: Public });
            add(
                ymd(12, 27),
                Holiday { name: "The first weekday after Christmas Day", category: Public },
            );
        }
        _ => {
            add(dec25, Holiday { name: "Christmas Day", category: Public });
            add(
                ymd(12, 26),
                Holiday { name: "The first weekday after Christmas Day", category: Public },
            );
        }
    }

    // Lunar-calendar holidays from the per-year table
    if let Some(entries) = LUNAR_TABLE.get(&year) {
        for &(m, d, holiday) in entries.iter() {
            add(ymd(m, d), holiday);
        }
    } else {
        tracing::debug!(year, "no lunar holiday table for year, rule-based holidays only");
    }

    out
}

/// Convenience lookup with both categories included, the shape the
/// aggregators consume.
pub fn general_holidays(year: i32) -> BTreeMap<NaiveDate, Holiday> {
    holidays_for(year, Region::HongKong, &[Public, Optional])
}
