// ISO 8601 duration parsing
// YouTube reports video length as PT#H#M#S with every component optional.

/// Parsed components of an ISO 8601 duration token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DurationParts {
    hours: u32,
    minutes: u32,
    seconds: u32,
    /// Whether any H/M/S component was actually present.
    matched: bool,
}

fn parse_iso8601_duration(token: &str) -> DurationParts {
    let mut parts = DurationParts::default();
    let mut current_num = String::new();

    for c in token.chars() {
        if c.is_ascii_digit() {
            current_num.push(c);
        } else {
            if let Ok(num) = current_num.parse::<u32>() {
                match c {
                    'H' => {
                        parts.hours = num;
                        parts.matched = true;
                    }
                    'M' => {
                        parts.minutes = num;
                        parts.matched = true;
                    }
                    'S' => {
                        parts.seconds = num;
                        parts.matched = true;
                    }
                    _ => {}
                }
            }
            current_num.clear();
        }
    }

    parts
}

/// Format a YouTube ISO 8601 duration as a clock string.
///
/// `PT1H2M3S` becomes `01:02:03`, `PT45S` becomes `00:45`. A token with no
/// recognizable components formats as `00:00`.
pub fn format_clock_duration(token: &str) -> String {
    let parts = parse_iso8601_duration(token);
    if !parts.matched {
        return "00:00".to_string();
    }

    if parts.hours > 0 {
        format!("{:02}:{:02}:{:02}", parts.hours, parts.minutes, parts.seconds)
    } else {
        format!("{:02}:{:02}", parts.minutes, parts.seconds)
    }
}

/// Total seconds of a clock string produced by [`format_clock_duration`].
/// Used when sorting the results view by duration.
pub fn clock_to_seconds(clock: &str) -> u64 {
    clock
        .split(':')
        .fold(0u64, |acc, part| acc * 60 + part.parse::<u64>().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_duration() {
        assert_eq!(format_clock_duration("PT1H2M3S"), "01:02:03");
        assert_eq!(format_clock_duration("PT10H0M5S"), "10:00:05");
    }

    #[test]
    fn test_short_durations() {
        assert_eq!(format_clock_duration("PT45S"), "00:45");
        assert_eq!(format_clock_duration("PT10M"), "10:00");
        assert_eq!(format_clock_duration("PT3M21S"), "03:21");
    }

    #[test]
    fn test_malformed_token() {
        assert_eq!(format_clock_duration("PTxyz"), "00:00");
        assert_eq!(format_clock_duration(""), "00:00");
        assert_eq!(format_clock_duration("P1D"), "00:00");
    }

    #[test]
    fn test_clock_to_seconds() {
        assert_eq!(clock_to_seconds("01:02:03"), 3723);
        assert_eq!(clock_to_seconds("00:45"), 45);
        assert_eq!(clock_to_seconds("00:00"), 0);
    }
}
