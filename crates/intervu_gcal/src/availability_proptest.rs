#[cfg(test)]
mod tests {
    use crate::availability::{compute_free_slots, BusyInterval, Horizon, TimeInterval, WorkingHours};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use chrono_tz::Tz;
    use proptest::prelude::*;

    fn base_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 9, 13, 27, 0).unwrap()
    }

    // Busy periods expressed as (offset from horizon start, length) in minutes;
    // offsets may start before the horizon.
    fn build_busy(horizon: &Horizon, raw: &[(i64, i64)]) -> Vec<BusyInterval> {
        raw.iter()
            .filter_map(|(offset, length)| {
                let start = horizon.time_min + Duration::minutes(*offset);
                TimeInterval::new(start, start + Duration::minutes(*length))
            })
            .collect()
    }

    // Total length of the union of `intervals` clipped to `window`.
    fn covered_minutes(intervals: &[BusyInterval], window: &TimeInterval) -> i64 {
        let mut clipped: Vec<TimeInterval> = intervals.iter().filter_map(|b| b.clip(window)).collect();
        clipped.sort();
        let mut total = 0;
        let mut cursor: Option<DateTime<Utc>> = None;
        for interval in clipped {
            let start = match cursor {
                Some(c) if c > interval.start() => c,
                _ => interval.start(),
            };
            if interval.end() > start {
                total += (interval.end() - start).num_minutes();
            }
            cursor = Some(cursor.map_or(interval.end(), |c| c.max(interval.end())));
        }
        total
    }

    proptest! {
        #[test]
        fn test_free_and_busy_cover_each_working_day(
            days in 0..10u32,
            raw in prop::collection::vec((-600..15_000i64, 1..600i64), 0..20),
        ) {
            let horizon = Horizon::new(base_now(), days, Tz::UTC);
            let hours = WorkingHours::default();
            let busy = build_busy(&horizon, &raw);
            let slots = compute_free_slots(&busy, &horizon, &hours);

            for date in horizon.dates() {
                let window = hours.window_on(date, Tz::UTC).unwrap();
                let free: i64 = slots
                    .iter()
                    .filter_map(|s| s.as_interval().clip(&window))
                    .map(|s| (s.end() - s.start()).num_minutes())
                    .sum();
                let blocked = covered_minutes(&busy, &window);
                prop_assert_eq!(free + blocked, (window.end() - window.start()).num_minutes());
            }
        }

        #[test]
        fn test_slots_are_disjoint_sorted_and_contained(
            days in 0..10u32,
            raw in prop::collection::vec((-600..15_000i64, 1..600i64), 0..20),
        ) {
            let horizon = Horizon::new(base_now(), days, Tz::UTC);
            let hours = WorkingHours::default();
            let busy = build_busy(&horizon, &raw);
            let slots = compute_free_slots(&busy, &horizon, &hours);

            for pair in slots.windows(2) {
                prop_assert!(pair[0].end <= pair[1].start, "overlap or disorder: {:?}", pair);
            }
            for slot in &slots {
                prop_assert!(slot.start < slot.end);
                prop_assert!(slot.start >= horizon.time_min && slot.end <= horizon.time_max);
                let window = hours.window_on(slot.start.date_naive(), Tz::UTC).unwrap();
                prop_assert!(slot.start >= window.start() && slot.end <= window.end());
                prop_assert!(!busy.iter().any(|b| b.overlaps(&slot.as_interval())));
            }
        }

        #[test]
        fn test_input_order_does_not_matter(
            raw in prop::collection::vec((-600..15_000i64, 1..600i64), 0..20),
        ) {
            let horizon = Horizon::new(base_now(), 7, Tz::UTC);
            let hours = WorkingHours::default();
            let busy = build_busy(&horizon, &raw);
            let mut reversed = busy.clone();
            reversed.reverse();
            prop_assert_eq!(
                compute_free_slots(&busy, &horizon, &hours),
                compute_free_slots(&reversed, &horizon, &hours)
            );
        }
    }
}
