use chrono::{DateTime, Duration, Utc};

/// Parse an RFC 3339 instant with an optional trailing offset:
/// `2024-04-08T19:02:26Z`, `2024-04-08T19:02:26Z + 5s`,
/// `2024-04-08T19:02:31Z - 3.1s`.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();

    if let Some(idx) = s.rfind(['+', '-']) {
        // Anything before index 10 is inside the date itself
        if idx > 10 {
            if let Ok(base) = DateTime::parse_from_rfc3339(s[..idx].trim()) {
                let offset = &s[idx..];
                let (neg, rest) = match offset.strip_prefix('-') {
                    Some(r) => (true, r),
                    None => (false, offset.strip_prefix('+').unwrap_or(offset)),
                };
                let dur = parse_offset(rest)?;
                let base = base.with_timezone(&Utc);
                let shifted = if neg {
                    base.checked_sub_signed(dur)
                } else {
                    base.checked_add_signed(dur)
                };
                return shifted.ok_or_else(|| format!("offset {} out of range", offset.trim()));
            }
        }
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

/// humantime duration, or plain (possibly fractional) seconds
fn parse_offset(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if let Ok(seconds) = s.trim_end_matches('s').parse::<f64>() {
        if seconds.is_finite() {
            return Ok(Duration::microseconds((seconds * 1e6).round() as i64));
        }
    }
    humantime::parse_duration(s)
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}
