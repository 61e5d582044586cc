use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DURATION_PATTERN: Regex =
        Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration pattern is valid");
}

/// Parse an ISO8601 duration (PT1H2M3S) to total seconds.
///
/// Missing components count as zero and anything unparseable yields 0.
pub fn parse_duration_to_seconds(raw: &str) -> u64 {
    let Some(captures) = DURATION_PATTERN.captures(raw) else {
        return 0;
    };

    // Digits-only captures only fail to parse on overflow.
    let component = |index: usize| -> u64 {
        captures
            .get(index)
            .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
            .unwrap_or(0)
    };

    component(1)
        .saturating_mul(3600)
        .saturating_add(component(2).saturating_mul(60))
        .saturating_add(component(3))
}

/// Render seconds as `H:MM:SS`, or `M:SS` under an hour.
pub fn format_seconds_as_clock(seconds: i64) -> String {
    if seconds <= 0 {
        return "0:00".to_string();
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let remaining_seconds = seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{remaining_seconds:02}")
    } else {
        format!("{minutes}:{remaining_seconds:02}")
    }
}
