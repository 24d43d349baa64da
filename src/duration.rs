use std::sync::LazyLock;

use regex::Regex;

static ISO_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").unwrap());

/// Parse a YouTube `PT#H#M#S` duration into seconds. Anything unparseable is 0.
pub fn parse_duration(encoded: &str) -> u64 {
    let Some(caps) = ISO_DURATION.captures(encoded.trim()) else {
        return 0;
    };
    let field = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    field(1)
        .saturating_mul(3600)
        .saturating_add(field(2).saturating_mul(60))
        .saturating_add(field(3))
}

/// Format seconds as `HH:MM:SS`, or `MM:SS` when under an hour
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_duration() {
        assert_eq!(parse_duration("PT1H2M3S"), 3723);
    }

    #[test]
    fn test_parse_partial_durations() {
        assert_eq!(parse_duration("PT15M"), 900);
        assert_eq!(parse_duration("PT45S"), 45);
        assert_eq!(parse_duration("PT2H"), 7200);
        assert_eq!(parse_duration("PT"), 0);
    }

    #[test]
    fn test_parse_malformed_is_zero() {
        assert_eq!(parse_duration(""), 0);
        assert_eq!(parse_duration("15 minutes"), 0);
        assert_eq!(parse_duration("P1D"), 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(754), "12:34");
        assert_eq!(format_duration(3723), "01:02:03");
    }
}
