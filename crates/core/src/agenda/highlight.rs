//! Highlight color assignment
//!
//! Greedy single pass over highlighted entries in time order. Each color
//! slot remembers when its last interval ends. An entry keeps its previous
//! color while that color does not overlap it, otherwise takes the first
//! slot that ended strictly before it starts, and when every slot is busy
//! falls back to round-robin and accepts the overlap.

use almanac_domain::Timestamp;
use chrono::Duration;
use tracing::trace;

use super::entry::AgendaEntry;

struct Palette {
    /// End of the last interval painted with each color; `None` is "never".
    busy_until: Vec<Option<Timestamp>>,
    last_assigned: Option<usize>,
}

impl Palette {
    fn new(size: usize) -> Self {
        Self { busy_until: vec![None; size], last_assigned: None }
    }

    fn busy_until(&self, color: usize) -> Option<Option<Timestamp>> {
        self.busy_until.get(color).copied()
    }

    /// The color's last interval ends at or before `start`.
    fn does_not_overlap(&self, color: usize, start: Timestamp) -> bool {
        self.busy_until(color).is_some_and(|until| until.map_or(true, |until| until <= start))
    }

    /// The color's last interval ended strictly before `start`.
    fn ended_before(&self, color: usize, start: Timestamp) -> bool {
        self.busy_until(color).is_some_and(|until| until.map_or(true, |until| until < start))
    }

    fn pick(&mut self, previous: Option<usize>, start: Timestamp) -> usize {
        if let Some(color) = previous.filter(|color| self.does_not_overlap(*color, start)) {
            return color;
        }
        if let Some(color) = (0..self.busy_until.len()).find(|color| self.ended_before(*color, start)) {
            return color;
        }
        let forced = self.last_assigned.map_or(0, |last| (last + 1) % self.busy_until.len());
        trace!(color = forced, at = %start, "highlight palette exhausted, reusing color");
        forced
    }

    fn occupy(&mut self, color: usize, until: Timestamp) {
        self.busy_until[color] = Some(until);
        self.last_assigned = Some(color);
    }
}

/// Assign colors to highlighted entries; `entries` must be sorted by time.
///
/// Entries of non-highlighted records lose any color they carried.
pub fn assign_highlights(entries: &mut [AgendaEntry], palette_size: usize) {
    let mut palette = Palette::new(palette_size);

    for entry in entries.iter_mut() {
        if !entry.record().is_highlighted() || palette_size == 0 {
            entry.color = None;
            entry.highlight_until = None;
            continue;
        }

        let start = entry.at();
        let length = entry.record().duration().unwrap_or_else(Duration::zero);
        let end = start.checked_add(length).unwrap_or(start);

        let color = palette.pick(entry.color, start);
        palette.occupy(color, end);
        entry.color = Some(color);
        entry.highlight_until = Some(end);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use almanac_domain::{ScheduledRecord, Visibility};

    use super::*;
    use crate::recurrence::PendingReminders;

    fn ts(raw: &str) -> Timestamp {
        Timestamp::parse(raw).unwrap()
    }

    fn highlighted(id: i64, at: &str, duration: &str) -> AgendaEntry {
        let record = ScheduledRecord::new(id, format!("h{id}"))
            .at(ts(at))
            .with_visibility(Visibility::Highlight)
            .with_duration(duration);
        AgendaEntry::new(Arc::new(record), ts(at), PendingReminders::default())
    }

    fn colors(entries: &[AgendaEntry]) -> Vec<Option<usize>> {
        entries.iter().map(AgendaEntry::color).collect()
    }

    #[test]
    fn overlapping_intervals_get_distinct_colors() {
        let mut entries = vec![
            highlighted(1, "202401010900", "2h"),
            highlighted(2, "202401011000", "2h"),
            highlighted(3, "202401011030", "1h"),
        ];
        assign_highlights(&mut entries, 3);
        assert_eq!(colors(&entries), vec![Some(0), Some(1), Some(2)]);
        assert_eq!(entries[0].highlight_until(), Some(ts("202401011100")));
    }

    #[test]
    fn back_to_back_intervals_take_the_next_free_color() {
        let mut entries = vec![highlighted(1, "202401010900", "1h"), highlighted(2, "202401011000", "1h")];
        assign_highlights(&mut entries, 3);
        assert_eq!(colors(&entries), vec![Some(0), Some(1)]);
    }

    #[test]
    fn same_start_never_shares_a_color() {
        let mut entries = vec![
            highlighted(1, "202401020900", "later"),
            highlighted(2, "202401020900", "1h"),
            highlighted(3, "202401021000", "1h"),
        ];
        assign_highlights(&mut entries, 3);
        assert_eq!(entries[0].highlight_until(), Some(ts("202401020900")));
        assert_eq!(colors(&entries), vec![Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn adjacent_interval_keeps_its_previous_color() {
        let mut entries = vec![highlighted(1, "202401010900", "1h"), highlighted(2, "202401011000", "1h")];
        entries[1].color = Some(0);
        assign_highlights(&mut entries, 2);
        assert_eq!(colors(&entries), vec![Some(0), Some(0)]);
    }

    #[test]
    fn exhausted_palette_falls_back_to_round_robin() {
        let mut entries = vec![
            highlighted(1, "202401010900", "3h"),
            highlighted(2, "202401010900", "3h"),
            highlighted(3, "202401010930", "3h"),
            highlighted(4, "202401011000", "3h"),
        ];
        assign_highlights(&mut entries, 2);
        assert_eq!(colors(&entries), vec![Some(0), Some(1), Some(0), Some(1)]);
    }

    #[test]
    fn forced_color_tracks_only_the_latest_interval() {
        let mut entries = vec![
            highlighted(1, "202401010900", "4h"),
            highlighted(2, "202401010900", "4h"),
            highlighted(3, "202401010930", "30m"),
            highlighted(4, "202401011100", "1h"),
        ];
        assign_highlights(&mut entries, 2);
        // Slot 0 is forced onto entry 3 and then ends at 10:00.
        assert_eq!(colors(&entries), vec![Some(0), Some(1), Some(0), Some(0)]);
        assert_eq!(entries[2].highlight_until(), Some(ts("202401011000")));
    }

    #[test]
    fn previous_color_is_kept_when_still_free() {
        let mut entries = vec![highlighted(1, "202401010900", "1h"), highlighted(2, "202401011200", "1h")];
        entries[1].color = Some(2);
        assign_highlights(&mut entries, 3);
        assert_eq!(colors(&entries), vec![Some(0), Some(2)]);
    }

    #[test]
    fn previous_color_is_dropped_when_it_would_overlap() {
        let mut entries = vec![highlighted(1, "202401010900", "2h"), highlighted(2, "202401011000", "1h")];
        entries[0].color = Some(1);
        entries[1].color = Some(1);
        assign_highlights(&mut entries, 3);
        assert_eq!(colors(&entries), vec![Some(1), Some(0)]);
    }

    #[test]
    fn non_highlighted_entries_are_cleared() {
        let record = ScheduledRecord::new(9, "plain").at(ts("202401010900"));
        let mut plain = AgendaEntry::new(Arc::new(record), ts("202401010900"), PendingReminders::default());
        plain.color = Some(4);
        let mut entries = vec![plain];
        assign_highlights(&mut entries, 3);
        assert_eq!(colors(&entries), vec![None]);
        assert_eq!(entries[0].highlight_until(), None);
    }

    #[test]
    fn stale_color_beyond_palette_is_reassigned() {
        let mut entries = vec![highlighted(1, "202401010900", "1h")];
        entries[0].color = Some(10);
        assign_highlights(&mut entries, 2);
        assert_eq!(colors(&entries), vec![Some(0)]);
    }
}
