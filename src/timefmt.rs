use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// Colloquial Indonesian time expressions, keyed off the marker word "jam".
// Pass order matters: the period-qualified pattern must claim its text before
// the looser decimal and basic patterns get a chance, and the decimal pattern
// before the basic one. Each pass is a global replace over the output of the
// previous pass.
//
// Branches ending in a letter carry their own trailing \b; "a.m."/"p.m." end
// in a literal dot, which is already a boundary.
static PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bjam\s*(\d{1,2})(?:[:.,]\s*(\d{1,2}(?:\.\d+)?))?\s*(pagi\b|siang\b|sore\b|malam\b|a\.m\.|p\.m\.|am\b|pm\b)",
    )
    .expect("period time pattern")
});

static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bjam\s*(\d{1,2})\s*[:.,]?\s*(\d*\.\d+)\b").expect("decimal time pattern"));

static BASIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bjam\s*(\d{1,2})(?:[:.,]\s*(\d{1,2}))?\b").expect("basic time pattern"));

// Chinese-style clock text occasionally pasted into Indonesian messages.
static ZH_CLOCK_MIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})點(\d{1,2})").expect("zh clock pattern"));
static ZH_CLOCK_HOUR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})點").expect("zh hour pattern"));

/// Rewrites every colloquial time expression in `text` to canonical `HH:MM`
/// (24-hour, zero-padded). Pure and idempotent: canonical output contains no
/// `jam` or `點` marker, so a second run is a no-op.
pub fn normalize_times(text: &str) -> String {
    let text = ZH_CLOCK_MIN_RE.replace_all(text, "$1:$2");
    let text = ZH_CLOCK_HOUR_RE.replace_all(&text, "$1:00");

    let text = PERIOD_RE.replace_all(&text, |caps: &Captures<'_>| {
        let hour = parse_hour(&caps[1]);
        let minute = caps.get(2).map(|m| parse_minute(m.as_str())).unwrap_or(0);
        to_hhmm(hour, minute, caps.get(3).map(|m| m.as_str()))
    });

    let text = DECIMAL_RE.replace_all(&text, |caps: &Captures<'_>| {
        let hour = parse_hour(&caps[1]);
        let frac: f64 = caps[2].parse().unwrap_or(0.0);
        to_hhmm(hour, (frac * 60.0).round() as u32, None)
    });

    let text = BASIC_RE.replace_all(&text, |caps: &Captures<'_>| {
        let hour = parse_hour(&caps[1]);
        let minute = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        to_hhmm(hour, minute, None)
    });

    text.into_owned()
}

fn parse_hour(s: &str) -> u32 {
    s.parse().unwrap_or(0)
}

/// Minute field of a period-qualified match: plain digits are literal
/// minutes, a decimal tail is a fraction of an hour.
fn parse_minute(s: &str) -> u32 {
    match s.split_once('.') {
        Some((_, frac)) => {
            let frac: f64 = format!("0.{frac}").parse().unwrap_or(0.0);
            (frac * 60.0).round() as u32
        }
        None => s.parse().unwrap_or(0),
    }
}

/// Canonical `HH:MM` with the period-of-day shift applied.
///
/// sore/malam/pm add 12 to hours below 12; pagi/am map hour 12 to 0; siang is
/// deliberately a no-op — midday hours are already written in their final
/// form in this domain (`jam 12 siang`, `jam 13 siang`).
fn to_hhmm(hour: u32, minute: u32, period: Option<&str>) -> String {
    let mut hour = hour;
    if let Some(p) = period {
        match p.to_lowercase().as_str() {
            "sore" | "malam" | "pm" | "p.m." => {
                if hour < 12 {
                    hour += 12;
                }
            }
            "pagi" | "am" | "a.m." => {
                if hour == 12 {
                    hour = 0;
                }
            }
            _ => {}
        }
    }
    format!("{:02}:{:02}", hour % 24, minute.min(59))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hour() {
        assert_eq!(normalize_times("jam 9"), "09:00");
    }

    #[test]
    fn explicit_minutes() {
        assert_eq!(normalize_times("jam 9:30"), "09:30");
        assert_eq!(normalize_times("jam 9,15"), "09:15");
    }

    #[test]
    fn afternoon_period() {
        assert_eq!(normalize_times("jam 3 sore"), "15:00");
        assert_eq!(normalize_times("jam 7 malam"), "19:00");
        assert_eq!(normalize_times("jam 3 pm"), "15:00");
    }

    #[test]
    fn midnight_wraps() {
        assert_eq!(normalize_times("jam 12 pagi"), "00:00");
        assert_eq!(normalize_times("jam 12 am"), "00:00");
    }

    #[test]
    fn siang_keeps_literal_hour() {
        assert_eq!(normalize_times("jam 12 siang"), "12:00");
        assert_eq!(normalize_times("jam 1 siang"), "01:00");
    }

    #[test]
    fn decimal_minutes_are_fractions() {
        assert_eq!(normalize_times("jam 9.5"), "09:30");
        assert_eq!(normalize_times("jam 9.25"), "09:15");
    }

    #[test]
    fn period_with_minutes() {
        assert_eq!(normalize_times("jam 3.30 sore"), "15:30");
        assert_eq!(normalize_times("jam 6:45 pagi"), "06:45");
    }

    #[test]
    fn hour_mod_24() {
        assert_eq!(normalize_times("jam 23 malam"), "23:00");
        assert_eq!(normalize_times("jam 12 malam"), "12:00");
    }

    #[test]
    fn no_space_after_marker() {
        assert_eq!(normalize_times("jam9"), "09:00");
    }

    #[test]
    fn embedded_in_sentence() {
        assert_eq!(
            normalize_times("nenek bangun jam 6 pagi dan makan jam 12"),
            "nenek bangun 06:00 dan makan 12:00"
        );
    }

    #[test]
    fn idempotent_on_canonical_text() {
        assert_eq!(normalize_times("14:30"), "14:30");
        let once = normalize_times("jam 3 sore");
        assert_eq!(normalize_times(&once), once);
    }

    #[test]
    fn chinese_clock_prepass() {
        assert_eq!(normalize_times("12點30"), "12:30");
        assert_eq!(normalize_times("12點"), "12:00");
    }

    #[test]
    fn untouched_without_marker() {
        assert_eq!(normalize_times("besok 9 pagi"), "besok 9 pagi");
    }
}
