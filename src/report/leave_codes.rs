/// Leave type 7 is the "official leave" partition; every other code is a
/// regular leave. The calendar fetch always queries the two partitions
/// with different predicates, never one query for both.
pub const OFFICIAL_LEAVE_TYPE: i32 = 7;

/// Two-letter display code for a leave type. Fixed table, locale
/// independent; unknown codes render as an empty string.
pub fn short_description(leave_type: i32) -> &'static str {
    match leave_type {
        0 => "OT",
        1 => "NP",
        2 => "AL",
        3 => "SP",
        4 => "SA",
        5 => "SN",
        6 => "SO",
        7 => "例", // Official Leave short code
        _ => "",
    }
}

/// Full description for the staff leave-detail listing.
pub fn full_description(leave_type: i32) -> &'static str {
    match leave_type {
        0 => "Others",
        1 => "Annual (No Paid)",
        2 => "Annual",
        3 => "Sick Leave (Paid)",
        4 => "Sick Leave (Annual)",
        5 => "Sick Leave (No Paid)",
        6 => "Sick Leave (Others)",
        7 => "Official Leave",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_codes_match_the_fixed_table() {
        let expected = [
            (0, "OT"),
            (1, "NP"),
            (2, "AL"),
            (3, "SP"),
            (4, "SA"),
            (5, "SN"),
            (6, "SO"),
            (7, "例"),
        ];
        for (code, short) in expected {
            assert_eq!(short_description(code), short);
        }
        assert_eq!(short_description(8), "");
        assert_eq!(short_description(-1), "");
    }

    #[test]
    fn full_descriptions_match_the_fixed_table() {
        assert_eq!(full_description(2), "Annual");
        assert_eq!(full_description(7), "Official Leave");
        assert_eq!(full_description(5), "Sick Leave (No Paid)");
        assert_eq!(full_description(99), "");
    }
}
