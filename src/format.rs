use chrono::{DateTime, Utc};

/// Placeholder for absent cells.
pub const DASH: &str = "-";

pub fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

pub fn optional_timestamp(dt: Option<&DateTime<Utc>>) -> String {
    dt.map_or_else(|| DASH.to_string(), timestamp)
}

pub fn ago(dt: &DateTime<Utc>) -> String {
    relative_to(dt, Utc::now())
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// "5 minutes ago", "in 2 hours" and so on, relative to `now`.
pub fn relative_to(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(*dt);
    let future = diff.num_seconds() < 0;
    let diff = if future { -diff } else { diff };

    let span = if diff.num_seconds() < 45 {
        return if future {
            "in a few seconds".to_string()
        } else {
            "a few seconds ago".to_string()
        };
    } else if diff.num_minutes() < 60 {
        plural(diff.num_minutes().max(1), "minute")
    } else if diff.num_hours() < 24 {
        plural(diff.num_hours(), "hour")
    } else if diff.num_days() < 30 {
        plural(diff.num_days(), "day")
    } else if diff.num_days() < 365 {
        plural(diff.num_days() / 30, "month")
    } else {
        plural(diff.num_days() / 365, "year")
    };

    if future {
        format!("in {span}")
    } else {
        format!("{span} ago")
    }
}
