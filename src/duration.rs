const SECONDS_PER_MINUTE: u32 = 60;
const SECONDS_PER_HOUR: u64 = 3600;

/// Minutes are unbounded; seconds must be below 60.
pub fn parse_duration(value: &str) -> Option<u32> {
    let (minutes, seconds) = value.trim().split_once(':')?;
    let minutes = parse_digits(minutes)?;
    let seconds = parse_digits(seconds)?;
    if seconds >= SECONDS_PER_MINUTE {
        return None;
    }
    minutes
        .checked_mul(SECONDS_PER_MINUTE)?
        .checked_add(seconds)
}

pub fn format_duration(total_seconds: u32) -> String {
    let minutes = total_seconds / SECONDS_PER_MINUTE;
    let seconds = total_seconds % SECONDS_PER_MINUTE;
    format!("{minutes}:{seconds:02}")
}

pub fn format_total(total_seconds: u64) -> String {
    let hours = total_seconds / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / u64::from(SECONDS_PER_MINUTE);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn parse_digits(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
