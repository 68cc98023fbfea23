/// Log-domain timestamp in microseconds
pub type Micros = i64;

pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Convert a log-domain time into the video domain (seconds).
///
/// `video = (log - log_min) / 1e6 + offset`
pub fn log_to_video(log_time: Micros, log_min: Micros, offset: f64) -> f64 {
    (log_time - log_min) as f64 / MICROS_PER_SECOND + offset
}

/// Convert a video-domain time (seconds) back into the log domain.
///
/// `log = (video - offset) * 1e6 + log_min`
pub fn video_to_log(video_time: f64, log_min: Micros, offset: f64) -> Micros {
    (((video_time - offset) * MICROS_PER_SECOND).round() as Micros).saturating_add(log_min)
}

/// Format a duration as `[hh:]mm:ss[.mmm]`
pub fn format_time(micros: Micros, with_millis: bool) -> String {
    let sign = if micros < 0 { "-" } else { "" };
    let total_ms = (micros.unsigned_abs() as f64 / 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    let mut out = String::from(sign);
    if hours > 0 {
        out.push_str(&format!("{:02}:", hours));
    }
    out.push_str(&format!("{:02}:{:02}", mins, secs));
    if with_millis {
        out.push_str(&format!(".{:03}", ms));
    }
    out
}

/// Parse user-entered time text into microseconds.
///
/// Accepts `[-][[hh:]mm:]ss[.fff]`; a bare number is seconds. Returns `None`
/// for anything malformed so callers can leave their field untouched.
pub fn parse_time(text: &str) -> Option<Micros> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if body.is_empty() {
        return None;
    }

    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() > 3 {
        return None;
    }

    let (last, whole) = parts.split_last()?;
    let seconds: f64 = last.parse().ok().filter(|s: &f64| s.is_finite() && *s >= 0.0)?;
    if !whole.is_empty() && seconds >= 60.0 {
        return None;
    }

    let mut total_mins = 0u64;
    for (i, part) in whole.iter().enumerate() {
        let value: u64 = part.parse().ok()?;
        // minutes after an hours field must stay below 60
        if i > 0 && value >= 60 {
            return None;
        }
        total_mins = total_mins.checked_mul(60)?.checked_add(value)?;
    }

    let micros = ((total_mins as f64 * 60.0 + seconds) * MICROS_PER_SECOND).round();
    // the cast would saturate
    if micros >= Micros::MAX as f64 {
        return None;
    }
    let micros = micros as Micros;
    Some(if negative { -micros } else { micros })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_video_scenario_offset() {
        // offset +2.5s, log starting at zero, video at 5.0s
        assert_eq!(video_to_log(5.0, 0, 2.5), 2_500_000);
        assert_eq!(log_to_video(2_500_000, 0, 2.5), 5.0);
    }

    #[test]
    fn test_video_to_log_saturates_on_wild_offset() {
        assert_eq!(video_to_log(10.0, 1_000_000, -1e300), Micros::MAX);
        assert_eq!(video_to_log(10.0, -1_000_000, 1e300), Micros::MIN);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0, true), "00:00.000");
        assert_eq!(format_time(61_250_000, true), "01:01.250");
        assert_eq!(format_time(61_250_000, false), "01:01");
        assert_eq!(format_time(3_723_000_000, false), "01:02:03");
        assert_eq!(format_time(-1_500_000, true), "-00:01.500");
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("1.5"), Some(1_500_000));
        assert_eq!(parse_time("01:01.250"), Some(61_250_000));
        assert_eq!(parse_time("1:02:03"), Some(3_723_000_000));
        assert_eq!(parse_time("-0:01.5"), Some(-1_500_000));
        assert_eq!(parse_time(" 2 "), Some(2_000_000));
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("abc"), None);
        assert_eq!(parse_time("1:2:3:4"), None);
        assert_eq!(parse_time("1:75"), None);
        assert_eq!(parse_time("1::2"), None);
    }

    #[test]
    fn test_parse_time_rejects_overflow() {
        assert_eq!(parse_time("1000000000000000000:00:00"), None);
        assert_eq!(parse_time("99999999999999999999:00"), None);
        assert_eq!(parse_time("9223372036854.8"), None);
        assert_eq!(parse_time("-9223372036854.8"), None);
        assert_eq!(parse_time("1e300"), None);
        // large but representable
        assert_eq!(parse_time("100:00:00"), Some(360_000_000_000));
    }

    proptest! {
        #[test]
        fn offset_relation_round_trips(
            log_time in -10_000_000_000i64..10_000_000_000i64,
            log_min in -1_000_000_000i64..1_000_000_000i64,
            offset in -3600.0f64..3600.0,
        ) {
            let video = log_to_video(log_time, log_min, offset);
            let back = video_to_log(video, log_min, offset);
            prop_assert!((back - log_time).abs() <= 1);
        }
    }
}
