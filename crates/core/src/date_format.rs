//! Relative date formatting for list cells and event details.

use chrono::{DateTime, Utc};

/// Formats a timestamp as `D Mon YYYY`, e.g. `5 Mar 2025`.
#[must_use]
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Formats a past timestamp relative to `now`.
///
/// Anything under a minute (including timestamps slightly in the future)
/// reads "a minute ago"; after a day and a half it falls back to the date.
#[must_use]
pub fn format_past(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - date).num_seconds();
    let minutes = seconds.div_euclid(60);
    let hours = minutes.div_euclid(60);
    let days = hours.div_euclid(24);

    if seconds < 60 {
        "a minute ago".to_owned()
    } else if minutes < 60 {
        format!("{minutes} minutes ago")
    } else if hours == 1 {
        "an hour ago".to_owned()
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else if days == 1 {
        "Yesterday".to_owned()
    } else {
        format_date(date)
    }
}

/// Formats a future timestamp as the remaining time from `now`.
#[must_use]
pub fn format_future(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (date - now).num_seconds();
    let minutes = seconds.div_euclid(60);
    let hours = minutes.div_euclid(60);

    if seconds > 0 && seconds < 60 {
        format!("{seconds} seconds")
    } else if minutes > 0 && minutes < 60 {
        format!("{minutes} minutes")
    } else if hours > 0 && hours < 24 {
        format!("{hours} hours")
    } else {
        format_date(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2025, 3, 5, 8, 30, 0).unwrap();
        assert_eq!(format_date(date), "5 Mar 2025");
    }

    #[test]
    fn test_past_buckets() {
        let now = now();
        assert_eq!(format_past(now - Duration::seconds(10), now), "a minute ago");
        assert_eq!(format_past(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_past(now - Duration::minutes(70), now), "an hour ago");
        assert_eq!(format_past(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(format_past(now - Duration::hours(30), now), "Yesterday");
        assert_eq!(format_past(now - Duration::days(5), now), "5 Mar 2025");
    }

    #[test]
    fn test_future_buckets() {
        let now = now();
        assert_eq!(format_future(now + Duration::seconds(30), now), "30 seconds");
        assert_eq!(format_future(now + Duration::minutes(12), now), "12 minutes");
        assert_eq!(format_future(now + Duration::hours(3), now), "3 hours");
        assert_eq!(format_future(now + Duration::days(3), now), "13 Mar 2025");
    }

    #[test]
    fn test_future_in_the_past_shows_date() {
        let now = now();
        assert_eq!(format_future(now - Duration::days(1), now), "9 Mar 2025");
    }
}
