use anyhow::{Context, Result};
use attendify_core::date_format::{format_date, format_future, format_past};
use attendify_service::calendar::{load_entries, truncate_words};
use attendify_service::{CalendarEntry, CalendarRange};
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color};

use crate::context::AppContext;
use crate::render;

const DESCRIPTION_WORDS: usize = 12;

/// Parses `YYYY-MM` into the padded month range.
fn month_range(raw: &str) -> Result<CalendarRange> {
    let (year, month) = raw.split_once('-').with_context(|| format!("month must be YYYY-MM, got '{raw}'"))?;
    let year: i32 = year.parse().with_context(|| format!("invalid year in '{raw}'"))?;
    let month: u32 = month.parse().with_context(|| format!("invalid month in '{raw}'"))?;
    Ok(CalendarRange::for_month(year, month)?)
}

fn relative(entry: &CalendarEntry, now: DateTime<Utc>) -> String {
    if entry.start > now { format!("in {}", format_future(entry.start, now)) } else { format_past(entry.start, now) }
}

pub(crate) async fn run_calendar(month: Option<&str>) -> Result<()> {
    let now = Utc::now();
    let range = match month {
        Some(raw) => month_range(raw)?,
        None => CalendarRange::around(now.date_naive()),
    };

    let ctx = AppContext::from_env()?;
    ctx.signed_in().await?;
    let entries = load_entries(&ctx.client, range).await?;

    println!("Events from {} to {}", range.start, format_date(range.end));
    let mut table = render::plain_table(&["Title", "Start", "End", "Days", "When", "Description"]);
    for entry in &entries {
        let days = if entry.is_multi_day() { entry.duration_days().to_string() } else { "1".to_owned() };
        table.add_row(vec![
            Cell::new(&entry.title).fg(Color::Cyan),
            Cell::new(format_date(entry.start)),
            Cell::new(format_date(entry.end)),
            Cell::new(days),
            Cell::new(relative(entry, now)),
            Cell::new(truncate_words(&entry.description, DESCRIPTION_WORDS)),
        ]);
    }
    println!("{table}");
    println!("{} event(s)", entries.len());
    Ok(())
}
