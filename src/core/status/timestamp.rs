use time::{
    Date, OffsetDateTime, Time, format_description::well_known::Rfc3339, macros::format_description,
};

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Current wall-clock time, in the local offset when it can be determined.
pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Timestamp string stored for route start and end.
pub fn format_timestamp(at: OffsetDateTime) -> anyhow::Result<String> {
    Ok(at.format(&Rfc3339)?)
}

/// `YYYY-MM-DD`, the form of the daily reset marker.
pub fn format_date(date: Date) -> anyhow::Result<String> {
    Ok(date.format(format_description!("[year]-[month]-[day]"))?)
}

enum Stamp {
    /// Milliseconds since the Unix epoch.
    Absolute(i128),
    /// Milliseconds since midnight of an unspecified day.
    WallClock(i128),
}

fn parse_stamp(value: &str) -> Option<Stamp> {
    let value = value.trim();
    if let Ok(at) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(Stamp::Absolute(at.unix_timestamp_nanos() / 1_000_000));
    }
    let time = Time::parse(value, format_description!("[hour]:[minute]:[second]"))
        .or_else(|_| Time::parse(value, format_description!("[hour]:[minute]")))
        .ok()?;
    let (h, m, s, milli) = time.as_hms_milli();
    let millis = ((h as i128 * 60 + m as i128) * 60 + s as i128) * 1000 + milli as i128;
    Some(Stamp::WallClock(millis))
}

/// Milliseconds from `start` to `end`.
///
/// Both must be RFC 3339 timestamps, or both `HH:MM[:SS]` times of the same
/// day. Anything else yields `None`.
pub fn elapsed_millis(start: &str, end: &str) -> Option<i64> {
    let diff = match (parse_stamp(start)?, parse_stamp(end)?) {
        (Stamp::Absolute(a), Stamp::Absolute(b)) => b - a,
        (Stamp::WallClock(a), Stamp::WallClock(b)) => b - a,
        _ => return None,
    };
    i64::try_from(diff).ok()
}

/// Whole minutes of `millis`, as "2h 30min" or "45min".
pub fn format_duration(millis: i64) -> String {
    let minutes = millis.div_euclid(MILLIS_PER_MINUTE);
    if minutes >= 60 {
        format!("{}h {}min", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}min")
    }
}
