use chrono::{DateTime, Months, TimeDelta, Utc};

/// How far ahead the events list looks
const LIST_HORIZON_MONTHS: u32 = 12;

/// `timeMin`/`timeMax` for an events list issued at `now`
pub fn list_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let horizon = now
        .checked_add_months(Months::new(LIST_HORIZON_MONTHS))
        .unwrap_or_else(|| now + TimeDelta::days(365));
    (now, horizon)
}
