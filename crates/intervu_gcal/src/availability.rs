// --- File: crates/intervu_gcal/src/availability.rs ---
//! Free/busy interval arithmetic.
//!
//! The engine reconciles the busy periods of a calendar against a daily
//! working-hours window over a horizon of whole days. All comparisons happen on
//! UTC instants; the scheduling time zone only decides where a day and its
//! working window begin and end.

use chrono::{
    DateTime, Datelike, Days, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use intervu_common::services::RawEvent;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

pub const DEFAULT_HORIZON_DAYS: u32 = 14;

/// A half-open UTC interval with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// A period during which the calendar owner is already committed.
pub type BusyInterval = TimeInterval;

impl TimeInterval {
    /// Returns `None` for zero-length or inverted intervals.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// The part of `self` inside `window`, if any.
    pub fn clip(&self, window: &TimeInterval) -> Option<TimeInterval> {
        TimeInterval::new(self.start.max(window.start), self.end.min(window.end))
    }
}

/// A bookable window returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FreeSlot {
    #[serde(serialize_with = "serialize_utc", deserialize_with = "deserialize_utc")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2025-04-09T09:00:00Z"))]
    pub start: DateTime<Utc>,
    #[serde(serialize_with = "serialize_utc", deserialize_with = "deserialize_utc")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2025-04-09T17:00:00Z"))]
    pub end: DateTime<Utc>,
}

impl FreeSlot {
    pub fn as_interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.start,
            end: self.end,
        }
    }
}

impl From<TimeInterval> for FreeSlot {
    fn from(interval: TimeInterval) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
        }
    }
}

/// Formats an instant the way the calendar boundary expects: `2025-04-09T15:00:00Z`.
pub fn format_utc(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses an RFC 3339 timestamp with `Z` or a numeric offset into UTC.
pub fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn serialize_utc<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_utc(value))
}

pub(crate) fn deserialize_utc<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_utc(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

/// The daily window in which interviews may be offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub working_days: Vec<Weekday>,
}

impl Default for WorkingHours {
    /// 09:00 to 17:00, every day of the week.
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
        }
    }
}

impl WorkingHours {
    /// The UTC window of `date`, or `None` when the template is empty.
    pub fn window_on(&self, date: NaiveDate, tz: Tz) -> Option<TimeInterval> {
        TimeInterval::new(
            local_instant(tz, date, self.start),
            local_instant(tz, date, self.end),
        )
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.working_days.contains(&date.weekday())
    }
}

/// Resolves a local wall-clock time to a UTC instant.
///
/// Ambiguous times pick the earlier instant; times skipped by a DST jump move
/// forward by an hour.
pub fn local_instant(tz: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(naive + chrono::Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// The days over which availability is computed: from local midnight of the
/// current day for `days` whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    pub first_day: NaiveDate,
    pub days: u32,
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub time_zone: Tz,
}

impl Horizon {
    /// A horizon reaching past the representable calendar is empty.
    pub fn new(now: DateTime<Utc>, days: u32, time_zone: Tz) -> Self {
        let first_day = now.with_timezone(&time_zone).date_naive();
        let (days, last_day) = match first_day.checked_add_days(Days::new(u64::from(days))) {
            Some(last_day) => (days, last_day),
            None => {
                warn!("Horizon of {} days is out of range, using an empty horizon", days);
                (0, first_day)
            }
        };
        Self {
            first_day,
            days,
            time_min: local_instant(time_zone, first_day, NaiveTime::MIN),
            time_max: local_instant(time_zone, last_day, NaiveTime::MIN),
            time_zone,
        }
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.days).filter_map(move |offset| {
            self.first_day
                .checked_add_days(Days::new(u64::from(offset)))
        })
    }

    pub fn as_interval(&self) -> Option<TimeInterval> {
        TimeInterval::new(self.time_min, self.time_max)
    }
}

/// Converts raw calendar events into busy intervals.
///
/// Timed events keep their own bounds. An all-day event blocks the working
/// window of every day it covers (`date` inclusive, end `date` exclusive),
/// clipped to the horizon. Events without parseable timestamps, and
/// zero-length or inverted ones, are skipped.
pub fn busy_intervals_from_events(
    events: &[RawEvent],
    horizon: &Horizon,
    hours: &WorkingHours,
) -> Vec<BusyInterval> {
    let Some(bounds) = horizon.as_interval() else {
        return Vec::new();
    };
    let mut busy = Vec::with_capacity(events.len());

    for event in events {
        match (&event.start.date_time, &event.end.date_time) {
            (Some(start), Some(end)) => match (parse_utc(start), parse_utc(end)) {
                (Some(start_dt), Some(end_dt)) => match TimeInterval::new(start_dt, end_dt) {
                    Some(interval) => busy.push(interval),
                    None => warn!(
                        "Skipping event {:?} with empty or inverted range: start='{}', end='{}'",
                        event.id, start, end
                    ),
                },
                _ => warn!(
                    "Could not parse event time: start='{}', end='{}'",
                    start, end
                ),
            },
            _ => match event.start.date.as_deref().and_then(parse_date) {
                Some(first) => {
                    let last = event
                        .end
                        .date
                        .as_deref()
                        .and_then(parse_date)
                        .filter(|end| *end > first)
                        .unwrap_or_else(|| first.succ_opt().unwrap_or(first));
                    push_all_day(&mut busy, first, last, horizon, hours, &bounds);
                }
                None => warn!(
                    "Skipping event {:?} without usable start/end: {:?} / {:?}",
                    event.id, event.start, event.end
                ),
            },
        }
    }
    busy
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn push_all_day(
    busy: &mut Vec<BusyInterval>,
    first: NaiveDate,
    end_exclusive: NaiveDate,
    horizon: &Horizon,
    hours: &WorkingHours,
    bounds: &TimeInterval,
) {
    let from = first.max(horizon.first_day);
    let horizon_end = horizon
        .first_day
        .checked_add_days(Days::new(u64::from(horizon.days)))
        .unwrap_or(horizon.first_day);
    let until = end_exclusive.min(horizon_end);

    let mut day = from;
    while day < until {
        if let Some(window) = hours.window_on(day, horizon.time_zone) {
            if let Some(clipped) = window.clip(bounds) {
                busy.push(clipped);
            }
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
}

/// Computes the free working-hours windows of every day in the horizon.
///
/// `busy` may be unsorted and may reach outside the horizon. The result is
/// sorted by start and pairwise disjoint. A fully booked day contributes no
/// slots; a zero-day horizon yields an empty list.
pub fn compute_free_slots(
    busy: &[BusyInterval],
    horizon: &Horizon,
    hours: &WorkingHours,
) -> Vec<FreeSlot> {
    let mut sorted = busy.to_vec();
    sorted.sort_by_key(|interval| interval.start);

    let mut free_slots = Vec::new();
    for date in horizon.dates() {
        if !hours.is_working_day(date) {
            continue;
        }
        let Some(window) = hours
            .window_on(date, horizon.time_zone)
            .and_then(|w| w.clip(&TimeInterval {
                start: horizon.time_min,
                end: horizon.time_max,
            }))
        else {
            continue;
        };

        let mut cursor = window.start;
        for interval in sorted.iter().filter(|b| b.overlaps(&window)) {
            let busy_start = interval.start.max(window.start);
            let busy_end = interval.end.min(window.end);
            if cursor < busy_start {
                free_slots.push(FreeSlot {
                    start: cursor,
                    end: busy_start,
                });
            }
            cursor = cursor.max(busy_end);
        }
        if cursor < window.end {
            free_slots.push(FreeSlot {
                start: cursor,
                end: window.end,
            });
        }
    }

    debug!(
        "Computed {} free slots over {} days from {} busy intervals",
        free_slots.len(),
        horizon.days,
        sorted.len()
    );
    free_slots
}

/// Normalizes `events` and computes the free slots of the horizon starting at `now`.
pub fn free_slots_for_events(
    events: &[RawEvent],
    horizon_days: u32,
    now: DateTime<Utc>,
    hours: &WorkingHours,
    time_zone: Tz,
) -> Vec<FreeSlot> {
    let horizon = Horizon::new(now, horizon_days, time_zone);
    let busy = busy_intervals_from_events(events, &horizon, hours);
    compute_free_slots(&busy, &horizon, hours)
}
