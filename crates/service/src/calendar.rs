//! Calendar adapter: visible range, event entries and detail helpers.

use attendify_client::ApiClient;
use attendify_core::{CALENDAR_DAYS_AFTER, CALENDAR_DAYS_BEFORE, CALENDAR_MONTH_PADDING_DAYS, CoreError, Event};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

use crate::error::ServiceError;

/// Dates whose events are loaded. `start` is sent as a date and `end` as an
/// instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarRange {
    pub start: NaiveDate,
    pub end: DateTime<Utc>,
}

impl CalendarRange {
    /// From yesterday to thirty days ahead.
    #[must_use]
    pub fn around(today: NaiveDate) -> Self {
        let start = today - Duration::days(CALENDAR_DAYS_BEFORE);
        let end = today + Duration::days(CALENDAR_DAYS_AFTER);
        Self { start, end: midnight(end) }
    }

    /// The whole month with a week of padding on both sides.
    ///
    /// # Errors
    /// `CoreError::InvalidInput` for a month outside 1..=12 or an
    /// unrepresentable year.
    pub fn for_month(year: i32, month: u32) -> Result<Self, CoreError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| CoreError::InvalidInput(format!("no such month: {year}-{month:02}")))?;
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or_else(|| CoreError::InvalidInput(format!("month out of range: {year}-{month:02}")))?;
        let padding = Duration::days(CALENDAR_MONTH_PADDING_DAYS);
        Ok(Self { start: first - padding, end: midnight(next + padding) })
    }

    /// Range for the month containing `date`.
    ///
    /// # Errors
    /// See [`CalendarRange::for_month`].
    pub fn month_of(date: NaiveDate) -> Result<Self, CoreError> {
        Self::for_month(date.year(), date.month())
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// An event as placed on the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: String,
    pub color: String,
}

impl From<&Event> for CalendarEntry {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            title: event.name.clone(),
            start: event.start_date,
            end: event.end_date,
            description: event.description.clone().unwrap_or_default(),
            color: pastel_color(&event.id),
        }
    }
}

impl CalendarEntry {
    #[must_use]
    pub fn is_multi_day(&self) -> bool {
        is_multi_day(self.start, self.end)
    }

    #[must_use]
    pub fn duration_days(&self) -> i64 {
        duration_days(self.start, self.end)
    }
}

/// Light `hsl()` colour, stable for a given id.
#[must_use]
pub fn pastel_color(id: &str) -> String {
    // FNV-1a
    let hash = id.bytes().fold(0x811c_9dc5_u32, |acc, b| (acc ^ u32::from(b)).wrapping_mul(0x0100_0193));
    format!("hsl({}, 80%, 85%)", hash % 360)
}

/// Whether start and end fall on different calendar days.
#[must_use]
pub fn is_multi_day(start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start.date_naive() != end.date_naive()
}

/// Span in days, rounded up.
#[must_use]
pub fn duration_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds().abs();
    let day = Duration::days(1).num_milliseconds();
    (millis + day - 1) / day
}

/// Keeps the first `max_words` space-separated words, appending `...` when
/// anything was cut.
#[must_use]
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split(' ').collect();
    if words.len() <= max_words {
        return text.to_owned();
    }
    format!("{}...", words[..max_words].join(" "))
}

/// Loads the events of `range` as calendar entries, in server order.
///
/// # Errors
/// The API error.
pub async fn load_entries(client: &ApiClient, range: CalendarRange) -> Result<Vec<CalendarEntry>, ServiceError> {
    let events = client.upcoming_events(range.start, range.end).await?;
    tracing::debug!(count = events.len(), start = %range.start, "Loaded calendar events");
    Ok(events.iter().map(CalendarEntry::from).collect())
}
