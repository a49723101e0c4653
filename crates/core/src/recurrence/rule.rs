//! Packed recurrence rule codec
//!
//! Wire form: `|`-separated segments, each tagged by its first character.
//!
//! | Segment                      | Meaning                                   |
//! |------------------------------|-------------------------------------------|
//! | `e=YYYYMMDDHHMM`             | explicit end of series                    |
//! | `x`                          | auto-extend the end bound                 |
//! | `aYYYYMMDDHH:MM`             | one-off extra occurrence                  |
//! | `dYYYYMMDDHH:MM`             | suppress an occurrence                    |
//! | `pdHHMM<days>`               | every N days                              |
//! | `pwHHMM<YN x5><weekday>`     | weekday (0 = Sunday) in flagged weeks     |
//! | `pmHHMM<day>`                | fixed day of month                        |
//!
//! Decoding never fails: every segment is validated on its own and dropped
//! when malformed.

use std::fmt;

use almanac_domain::constants::{RULE_HORIZON_MONTHS, WEEKS_IN_MONTH_MASK};
use almanac_domain::Timestamp;
use chrono::{Datelike, Months, NaiveDate, NaiveTime, Timelike};
use tracing::trace;

/// Length of `e=`, `a` and `d` segments including the tag
const FIXED_SEGMENT_LEN: usize = 14;
/// Shortest `p` segment: tag, kind, four time digits, one argument digit
const MIN_PATTERN_LEN: usize = 7;

/// One pattern or exception of a recurrence rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceEntry {
    /// Every `interval` days at a fixed time
    NDays { at: NaiveTime, interval: i32 },
    /// `weekday` (0 = Sunday) in the flagged weeks of the month
    WeekOfMonth { at: NaiveTime, weekday: i32, weeks: Vec<bool> },
    /// Fixed numeric day of the month
    DayOfMonth { at: NaiveTime, day: i32 },
    AddSpecific { at: Timestamp },
    DeleteSpecific { at: Timestamp },
}

impl RecurrenceEntry {
    /// Pattern entries generate occurrences; exceptions carry a concrete date.
    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::NDays { .. } | Self::WeekOfMonth { .. } | Self::DayOfMonth { .. })
    }

    fn pack(&self) -> String {
        match self {
            Self::NDays { at, interval } => format!("pd{}{interval}", hhmm(*at)),
            Self::WeekOfMonth { at, weekday, weeks } => {
                let flags: String = (0..WEEKS_IN_MONTH_MASK)
                    .map(|i| if weeks.get(i).copied().unwrap_or(false) { 'Y' } else { 'N' })
                    .collect();
                format!("pw{}{flags}{weekday}", hhmm(*at))
            }
            Self::DayOfMonth { at, day } => format!("pm{}{day}", hhmm(*at)),
            Self::AddSpecific { at } => format!("a{}", date_and_clock(*at)),
            Self::DeleteSpecific { at } => format!("d{}", date_and_clock(*at)),
        }
    }
}

/// Decoded recurrence rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// Last moment at which occurrences may be generated
    pub end_time: Timestamp,
    /// Keep `end_time` at least one horizon ahead of today
    pub auto_extend: bool,
    pub entries: Vec<RecurrenceEntry>,
}

/// Outcome of decoding a single segment
enum Segment {
    End(Timestamp),
    AutoExtend,
    Entry(RecurrenceEntry),
    Skip(&'static str),
}

impl RecurrenceRule {
    /// Default end bound: midnight one horizon after `today`.
    pub fn horizon(today: NaiveDate) -> Timestamp {
        let end = today.checked_add_months(Months::new(RULE_HORIZON_MONTHS)).unwrap_or(today);
        Timestamp::start_of(end)
    }

    /// An empty, auto-extending rule.
    pub fn new(today: NaiveDate) -> Self {
        Self { end_time: Self::horizon(today), auto_extend: true, entries: Vec::new() }
    }

    /// Decode an optional packed string; absent or empty means "does not repeat".
    pub fn build(packed: Option<&str>, today: NaiveDate) -> Option<Self> {
        packed.and_then(|packed| Self::parse(packed, today))
    }

    /// Decode a packed rule string relative to `today`.
    pub fn parse(packed: &str, today: NaiveDate) -> Option<Self> {
        if packed.is_empty() {
            return None;
        }

        let horizon = Self::horizon(today);
        let mut end_time = None;
        let mut auto_extend = false;
        let mut entries = Vec::new();

        for raw in packed.split('|') {
            match decode_segment(raw) {
                Segment::End(at) => end_time = Some(at),
                Segment::AutoExtend => auto_extend = true,
                Segment::Entry(entry) => entries.push(entry),
                Segment::Skip(reason) => trace!(segment = raw, reason, "dropping recurrence segment"),
            }
        }

        // A rule without an explicit end keeps rolling forward.
        let auto_extend = auto_extend || end_time.is_none();
        let mut end_time = end_time.unwrap_or(horizon);
        if auto_extend && end_time < horizon {
            end_time = horizon;
        }

        Some(Self { end_time, auto_extend, entries })
    }

    /// Encode for storage; the inverse of [`RecurrenceRule::parse`].
    pub fn pack_for_storage(&self) -> String {
        let mut segments = vec![format!("e={}", self.end_time)];
        if self.auto_extend {
            segments.push("x".to_string());
        }
        segments.extend(self.entries.iter().map(RecurrenceEntry::pack));
        segments.join("|")
    }

    pub fn push(&mut self, entry: RecurrenceEntry) {
        self.entries.push(entry);
    }

    /// Pattern entries in rule order.
    pub fn patterns(&self) -> impl Iterator<Item = &RecurrenceEntry> {
        self.entries.iter().filter(|entry| entry.is_pattern())
    }

    /// Timestamps of `AddSpecific` entries.
    pub fn additions(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            RecurrenceEntry::AddSpecific { at } => Some(*at),
            _ => None,
        })
    }

    /// Timestamps of `DeleteSpecific` entries.
    pub fn deletions(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            RecurrenceEntry::DeleteSpecific { at } => Some(*at),
            _ => None,
        })
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pack_for_storage())
    }
}

fn decode_segment(raw: &str) -> Segment {
    let Some(tag) = raw.chars().next() else {
        return Segment::Skip("empty segment");
    };

    match tag {
        'e' => decode_end(raw),
        'x' if raw == "x" => Segment::AutoExtend,
        'x' => Segment::Skip("auto-extend flag carries a payload"),
        'a' => decode_exception(raw).map_or(Segment::Skip("malformed addition"), |at| {
            Segment::Entry(RecurrenceEntry::AddSpecific { at })
        }),
        'd' => decode_exception(raw).map_or(Segment::Skip("malformed deletion"), |at| {
            Segment::Entry(RecurrenceEntry::DeleteSpecific { at })
        }),
        'p' => decode_pattern(raw),
        _ => Segment::Skip("unknown tag"),
    }
}

fn decode_end(raw: &str) -> Segment {
    if raw.len() != FIXED_SEGMENT_LEN {
        return Segment::Skip("end segment has wrong length");
    }
    if !raw.starts_with("e=") {
        return Segment::Skip("end segment lacks '='");
    }
    raw.get(2..)
        .and_then(|value| Timestamp::parse(value).ok())
        .map_or(Segment::Skip("end segment is not a timestamp"), Segment::End)
}

/// `<tag>YYYYMMDDHH:MM`
fn decode_exception(raw: &str) -> Option<Timestamp> {
    if raw.len() != FIXED_SEGMENT_LEN {
        return None;
    }
    let date = raw.get(1..9)?;
    let clock = raw.get(9..)?;
    let (hours, minutes) = clock.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    Timestamp::parse(&format!("{date}{hours}{minutes}")).ok()
}

fn decode_pattern(raw: &str) -> Segment {
    if raw.len() < MIN_PATTERN_LEN {
        return Segment::Skip("pattern segment too short");
    }
    let Some(at) = raw.get(2..6).and_then(parse_hhmm) else {
        return Segment::Skip("pattern time is not HHMM");
    };
    let payload = raw.get(6..).unwrap_or_default();

    let entry = match raw.get(1..2) {
        Some("d") => RecurrenceEntry::NDays { at, interval: payload.parse().unwrap_or(1) },
        Some("w") => {
            let (Some(flags), Some(weekday)) = (payload.get(..WEEKS_IN_MONTH_MASK), payload.get(WEEKS_IN_MONTH_MASK..))
            else {
                return Segment::Skip("week pattern missing flags");
            };
            let Ok(weekday) = weekday.parse() else {
                return Segment::Skip("week pattern weekday is not a number");
            };
            let weeks = flags.chars().map(|flag| flag == 'Y').collect();
            RecurrenceEntry::WeekOfMonth { at, weekday, weeks }
        }
        Some("m") => {
            let Ok(day) = payload.parse() else {
                return Segment::Skip("month pattern day is not a number");
            };
            RecurrenceEntry::DayOfMonth { at, day }
        }
        _ => return Segment::Skip("unknown pattern kind"),
    };

    Segment::Entry(entry)
}

fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour = raw.get(..2)?.parse().ok()?;
    let minute = raw.get(2..)?.parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn hhmm(at: NaiveTime) -> String {
    format!("{:02}{:02}", at.hour(), at.minute())
}

fn date_and_clock(at: Timestamp) -> String {
    let date = at.date();
    let time = at.time();
    format!(
        "{:04}{:02}{:02}{:02}:{:02}",
        date.year(),
        date.month(),
        date.day(),
        time.hour(),
        time.minute()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn ts(raw: &str) -> Timestamp {
        Timestamp::parse(raw).unwrap()
    }

    #[test]
    fn empty_or_absent_means_no_rule() {
        assert_eq!(RecurrenceRule::parse("", today()), None);
        assert_eq!(RecurrenceRule::build(None, today()), None);
    }

    #[test]
    fn decodes_every_segment_kind() {
        let rule = RecurrenceRule::parse(
            "e=202412310900|x|a2024020110:30|d2024011509:00|pd08302|pw0900YNYNN1|pm120015",
            today(),
        )
        .unwrap();

        assert!(rule.auto_extend);
        assert_eq!(rule.end_time, ts("202501010000"));
        assert_eq!(
            rule.entries,
            vec![
                RecurrenceEntry::AddSpecific { at: ts("202402011030") },
                RecurrenceEntry::DeleteSpecific { at: ts("202401150900") },
                RecurrenceEntry::NDays { at: time(8, 30), interval: 2 },
                RecurrenceEntry::WeekOfMonth {
                    at: time(9, 0),
                    weekday: 1,
                    weeks: vec![true, false, true, false, false],
                },
                RecurrenceEntry::DayOfMonth { at: time(12, 0), day: 15 },
            ]
        );
    }

    #[test]
    fn explicit_end_without_extend_is_kept() {
        let rule = RecurrenceRule::parse("e=202401310900|pd09001", today()).unwrap();
        assert!(!rule.auto_extend);
        assert_eq!(rule.end_time, ts("202401310900"));
    }

    #[test]
    fn missing_end_defaults_to_auto_extending_horizon() {
        let rule = RecurrenceRule::parse("pd09001", today()).unwrap();
        assert!(rule.auto_extend);
        assert_eq!(rule.end_time, ts("202501010000"));
    }

    #[test]
    fn malformed_end_is_ignored() {
        let rule = RecurrenceRule::parse("e=2024|pd09001", today()).unwrap();
        assert_eq!(rule.end_time, RecurrenceRule::horizon(today()));

        let rule = RecurrenceRule::parse("e=20241301090x", today()).unwrap();
        assert_eq!(rule.end_time, RecurrenceRule::horizon(today()));
    }

    #[test]
    fn end_without_equals_sign_is_ignored() {
        let rule = RecurrenceRule::parse("eQ202402290900|pd09001", today()).unwrap();
        assert_eq!(rule.end_time, RecurrenceRule::horizon(today()));
        assert!(rule.auto_extend);
    }

    #[test]
    fn only_a_bare_x_turns_on_auto_extend() {
        let rule = RecurrenceRule::parse("e=202401310900|xyz-garbage", today()).unwrap();
        assert!(!rule.auto_extend);
        assert_eq!(rule.end_time, ts("202401310900"));
        assert_eq!(rule.pack_for_storage(), "e=202401310900");
    }

    #[test]
    fn malformed_segments_are_dropped_independently() {
        let rule = RecurrenceRule::parse(
            "e=202406010000|a20240101|d2024011509:0|pd|pq0900|pw0900YY|pmxx0015|pd25001|zzz|pm0900x|pd09003",
            today(),
        )
        .unwrap();

        assert_eq!(rule.entries, vec![RecurrenceEntry::NDays { at: time(9, 0), interval: 3 }]);
        assert_eq!(rule.end_time, ts("202406010000"));
    }

    #[test]
    fn unparsable_day_interval_defaults_to_one() {
        let rule = RecurrenceRule::parse("pd0900x", today()).unwrap();
        assert_eq!(rule.entries, vec![RecurrenceEntry::NDays { at: time(9, 0), interval: 1 }]);
    }

    #[test]
    fn rule_with_only_bounds_is_legal() {
        let rule = RecurrenceRule::parse("e=202403010000", today()).unwrap();
        assert!(rule.entries.is_empty());
        assert_eq!(rule.end_time, ts("202403010000"));
    }

    #[test]
    fn packs_in_canonical_order() {
        let mut rule = RecurrenceRule {
            end_time: ts("202412310900"),
            auto_extend: true,
            entries: Vec::new(),
        };
        rule.push(RecurrenceEntry::DeleteSpecific { at: ts("202401150900") });
        rule.push(RecurrenceEntry::NDays { at: time(7, 5), interval: 3 });

        assert_eq!(rule.pack_for_storage(), "e=202412310900|x|d2024011509:00|pd07053");
        assert_eq!(rule.to_string(), rule.pack_for_storage());
    }

    #[test]
    fn week_flags_always_pack_as_five_characters() {
        let short = RecurrenceEntry::WeekOfMonth { at: time(9, 0), weekday: 6, weeks: vec![true] };
        assert_eq!(short.pack(), "pw0900YNNNN6");

        let long = RecurrenceEntry::WeekOfMonth { at: time(9, 0), weekday: 0, weeks: vec![true; 7] };
        assert_eq!(long.pack(), "pw0900YYYYY0");
    }

    #[test]
    fn self_produced_rules_survive_a_round_trip() {
        let packed = "x|a2024020110:30|d2024011509:00|pd08302|pw0900YNYNN1|pm120031";
        let rule = RecurrenceRule::parse(packed, today()).unwrap();
        let again = RecurrenceRule::parse(&rule.pack_for_storage(), today()).unwrap();
        assert_eq!(again, rule);
        assert_eq!(again.pack_for_storage(), rule.pack_for_storage());
    }

    #[test]
    fn auto_extend_pushes_stale_end_forward() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let rule = RecurrenceRule::parse("e=202001010000|x|pd09001", today).unwrap();
        assert!(rule.end_time >= ts("202506010000"));
        assert_eq!(rule.end_time, ts("202506010000"));

        let far = RecurrenceRule::parse("e=203001010000|x", today).unwrap();
        assert_eq!(far.end_time, ts("203001010000"));
    }

    #[test]
    fn exception_accessors() {
        let rule =
            RecurrenceRule::parse("a2024020110:30|d2024011509:00|d2024012209:00", today()).unwrap();
        assert_eq!(rule.additions().collect::<Vec<_>>(), vec![ts("202402011030")]);
        assert_eq!(rule.deletions().count(), 2);
        assert_eq!(rule.patterns().count(), 0);
    }
}
