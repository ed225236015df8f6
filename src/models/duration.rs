// Duration helpers: compact human-readable formatting and millisecond serialization

use serde::Serializer;
use std::time::Duration;

/// Formats a duration the compact way the log and dashboard show it:
/// `0s`, `850µs`, `15ms`, `2.5s`, `1m30s`, `1h0m5s`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let nanos = d.subsec_nanos();

    if secs == 0 {
        return match nanos {
            0 => "0s".to_string(),
            n if n < 1_000 => format!("{n}ns"),
            n if n < 1_000_000 => format!("{}{}µs", n / 1_000, fraction(n % 1_000, 3)),
            n => format!("{}{}ms", n / 1_000_000, fraction(n % 1_000_000, 6)),
        };
    }

    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let frac = fraction(nanos, 9);
    if h > 0 {
        format!("{h}h{m}m{s}{frac}s")
    } else if m > 0 {
        format!("{m}m{s}{frac}s")
    } else {
        format!("{s}{frac}s")
    }
}

/// `.5`, `.025` etc. for a remainder with `digits` decimal places; empty when zero.
fn fraction(rem: u32, digits: usize) -> String {
    if rem == 0 {
        return String::new();
    }
    let padded = format!("{rem:0digits$}");
    format!(".{}", padded.trim_end_matches('0'))
}

pub(crate) fn serialize_ms<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

pub(crate) fn serialize_opt_ms<S: Serializer>(
    d: &Option<Duration>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => serialize_ms(d, s),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }

    #[test]
    fn formats_sub_second() {
        assert_eq!(format_duration(Duration::from_millis(15)), "15ms");
        assert_eq!(format_duration(Duration::from_micros(15_250)), "15.25ms");
        assert_eq!(format_duration(Duration::from_micros(850)), "850µs");
        assert_eq!(format_duration(Duration::from_nanos(42)), "42ns");
    }

    #[test]
    fn formats_seconds_minutes_hours() {
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_secs(3605)), "1h0m5s");
        assert_eq!(format_duration(Duration::from_millis(60_025)), "1m0.025s");
    }
}
