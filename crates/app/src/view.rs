//! Plain-text rendering of the upcoming agenda

use almanac_core::AgendaCache;
use almanac_domain::Timestamp;
use chrono::{Duration, NaiveDate};

/// Render occurrences from the start of `today` through `days` days ahead.
pub fn render_upcoming(cache: &AgendaCache, today: NaiveDate, days: i64) -> String {
    let from = Timestamp::start_of(today);
    let to = Duration::try_days(days)
        .and_then(|span| today.checked_add_signed(span))
        .map_or(from, Timestamp::start_of);

    let entries = cache.entries_between(from, to);
    if entries.is_empty() {
        return format!("Nothing scheduled in the next {days} days.");
    }

    let mut out = format!("Upcoming ({} occurrences):", entries.len());
    let mut current_day = None;
    for entry in entries {
        let at = entry.at();
        if current_day != Some(at.date()) {
            current_day = Some(at.date());
            out.push_str(&format!("\n{}", at.date().format("%a %Y-%m-%d")));
        }

        let color = entry.color().map(|color| format!(" [c{color}]")).unwrap_or_default();
        let repeat = if entry.is_current_instance() { "" } else { " (repeat)" };
        out.push_str(&format!("\n  {}{color} {}{repeat}", at.time().format("%H:%M"), entry.record().title));
    }
    out
}
