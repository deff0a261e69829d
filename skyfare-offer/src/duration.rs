use once_cell::sync::Lazy;
use regex::Regex;

static DAYS: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)D").expect("static pattern"));
static HOURS: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)H").expect("static pattern"));
static MINUTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)M").expect("static pattern"));

pub const MISSING_DURATION: &str = "--";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DurationParts {
    days: u32,
    hours: u32,
    minutes: u32,
}

/// Components past `u32::MAX` saturate rather than reading as zero.
fn capture(pattern: &Regex, haystack: &str) -> u32 {
    pattern
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().parse().unwrap_or(u32::MAX))
        .unwrap_or(0)
}

fn parts(iso: Option<&str>) -> Option<DurationParts> {
    let iso = iso.map(str::trim).filter(|s| !s.is_empty())?;
    let upper = iso.to_ascii_uppercase();
    Some(DurationParts {
        days: capture(&DAYS, &upper),
        hours: capture(&HOURS, &upper),
        minutes: capture(&MINUTES, &upper),
    })
}

/// Render an ISO-8601 day/hour/minute duration (`P1DT10H30M`) as `1d 10h 30m`.
///
/// Zero components are dropped, except that minutes are always printed when
/// there are no days or hours, so a zero-length duration reads `0m`.
/// Missing input renders as `--`; malformed input never fails.
pub fn parse_duration(iso: Option<&str>) -> String {
    let Some(DurationParts {
        days,
        hours,
        minutes,
    }) = parts(iso)
    else {
        return MISSING_DURATION.to_string();
    };

    let mut out = Vec::with_capacity(3);
    if days > 0 {
        out.push(format!("{days}d"));
    }
    if hours > 0 {
        out.push(format!("{hours}h"));
    }
    if minutes > 0 || (days == 0 && hours == 0) {
        out.push(format!("{minutes}m"));
    }
    out.join(" ")
}

/// Total minutes of the same day/hour/minute components.
pub fn duration_minutes(iso: Option<&str>) -> Option<u32> {
    parts(iso).map(|p| {
        p.days
            .saturating_mul(24 * 60)
            .saturating_add(p.hours.saturating_mul(60))
            .saturating_add(p.minutes)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_duration() {
        assert_eq!(parse_duration(Some("P1DT10H30M")), "1d 10h 30m");
    }

    #[test]
    fn test_minutes_only() {
        assert_eq!(parse_duration(Some("PT45M")), "45m");
    }

    #[test]
    fn test_zero_components_dropped() {
        assert_eq!(parse_duration(Some("PT2H")), "2h");
        assert_eq!(parse_duration(Some("P1D")), "1d");
        assert_eq!(parse_duration(Some("PT1H5M")), "1h 5m");
    }

    #[test]
    fn test_never_empty() {
        assert_eq!(parse_duration(Some("PT0S")), "0m");
        assert_eq!(parse_duration(Some("PT0M")), "0m");
        assert_eq!(parse_duration(Some("garbage")), "0m");
    }

    #[test]
    fn test_missing_input() {
        assert_eq!(parse_duration(None), "--");
        assert_eq!(parse_duration(Some("")), "--");
    }

    #[test]
    fn test_lowercase_input() {
        assert_eq!(parse_duration(Some("pt3h15m")), "3h 15m");
    }

    #[test]
    fn test_oversized_components_saturate() {
        assert_eq!(parse_duration(Some("P5000000000D")), "4294967295d");
        assert_eq!(duration_minutes(Some("P5000000000D")), Some(u32::MAX));
        assert_eq!(duration_minutes(Some("PT99999999999999999999999M")), Some(u32::MAX));
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(duration_minutes(Some("P1DT10H30M")), Some(2070));
        assert_eq!(duration_minutes(Some("PT45M")), Some(45));
        assert_eq!(duration_minutes(None), None);
    }
}
