use std::fmt::Write;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use feed_engine::Story;

pub(crate) const HEADING: &str = "Best Stories";

/// "3 hours ago" style age of a unix timestamp relative to `now`.
pub(crate) fn relative_time(unix_secs: i64, now: DateTime<Utc>) -> String {
    let Some(then) = Utc.timestamp_opt(unix_secs, 0).single() else {
        return "some time ago".to_string();
    };
    let elapsed = now.signed_duration_since(then);
    if elapsed.num_seconds() < 45 {
        return "a few seconds ago".to_string();
    }

    let (count, unit) = if elapsed.num_minutes() < 60 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_hours() < 24 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 30 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_days() < 365 {
        (elapsed.num_days() / 30, "month")
    } else {
        (elapsed.num_days() / 365, "year")
    };

    match count {
        0 | 1 => format!("a{} {unit} ago", if unit == "hour" { "n" } else { "" }),
        n => format!("{n} {unit}s ago"),
    }
}

pub(crate) fn render_story(story: &Story, now: DateTime<Utc>) -> String {
    if story.is_stub() {
        return format!("(unavailable #{})", story.id);
    }

    let mut out = String::new();
    let title = story.title.as_deref().unwrap_or("(untitled)");
    match story.domain() {
        Some(domain) => {
            let _ = writeln!(out, "{title} ({domain})");
        }
        None => {
            let _ = writeln!(out, "{title}");
        }
    }

    let _ = write!(
        out,
        "  [{}] by {} on {} with {} comments",
        story.score.unwrap_or(0),
        story.by.as_deref().unwrap_or("unknown"),
        relative_time(story.time.unwrap_or(0), now),
        story.descendants.unwrap_or(0)
    );
    if let Some(url) = story.url.as_deref() {
        let _ = write!(out, "\n  {url}");
    }
    out
}

pub(crate) fn render_feed(stories: &[Arc<Story>], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{HEADING}");
    let _ = writeln!(out, "{}", "=".repeat(HEADING.len()));
    for (position, story) in stories.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", position + 1, render_story(story, now));
    }
    out
}
