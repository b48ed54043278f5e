/// Compact age string for a unix timestamp: "5m", "3h", "2d", "1y".
///
/// Thresholds are strictly-greater comparisons, so exactly one unit of a
/// period falls through to the next smaller one. A zero timestamp yields
/// an empty string.
pub fn time_ago(timestamp_secs: i64, now_secs: i64) -> String {
    if timestamp_secs == 0 {
        return String::new();
    }
    let seconds = now_secs - timestamp_secs;

    const PERIODS: [(i64, &str); 5] = [
        (31_536_000, "y"),
        (2_592_000, "mo"),
        (86_400, "d"),
        (3_600, "h"),
        (60, "m"),
    ];

    for (unit, suffix) in PERIODS {
        if seconds > unit {
            return format!("{}{}", seconds / unit, suffix);
        }
    }
    format!("{}s", seconds.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_zero_timestamp_is_empty() {
        assert_eq!(time_ago(0, NOW), "");
    }

    #[test]
    fn test_seconds() {
        assert_eq!(time_ago(NOW - 45, NOW), "45s");
    }

    #[test]
    fn test_minutes_hours_days() {
        assert_eq!(time_ago(NOW - 300, NOW), "5m");
        assert_eq!(time_ago(NOW - 7_200, NOW), "2h");
        assert_eq!(time_ago(NOW - 172_801, NOW), "2d");
    }

    #[test]
    fn test_exactly_one_unit_falls_through() {
        // Exactly one hour is not "> 1h", so it reads as minutes.
        assert_eq!(time_ago(NOW - 3_600, NOW), "60m");
    }

    #[test]
    fn test_years() {
        assert_eq!(time_ago(NOW - 2 * 31_536_000 - 1, NOW), "2y");
    }
}
