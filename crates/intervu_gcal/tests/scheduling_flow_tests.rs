use chrono::{Duration, TimeZone, Utc};
use intervu_gcal::booking::ErrorKind;
mod fixtures;

#[tokio::test]
async fn test_offer_book_and_reoffer() {
    let (scheduler, store, notifier) = fixtures::create_scheduler();
    let now = Utc.with_ymd_and_hms(2025, 4, 9, 6, 0, 0).unwrap();

    // Step 1: the whole working day is free
    let slots = scheduler.get_free_slots_at(None, Some(1), now).await.unwrap();
    assert_eq!(slots.len(), 1);
    let offered = slots[0];

    // Step 2: book the first hour of the offered slot
    let request = fixtures::create_booking_request(offered.start, 60, "ada@example.com");
    let outcome = scheduler.book_interview(request.clone()).await;
    assert!(outcome.is_success(), "{}", outcome);
    assert_eq!(
        notifier.recipients(),
        vec!["ada@example.com", "recruiter@example.com"]
    );

    // Step 3: the booked hour is no longer offered
    let slots = scheduler.get_free_slots_at(None, Some(1), now).await.unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, offered.start + Duration::hours(1));
    assert_eq!(slots[0].end, offered.end);

    // Step 4: a second candidate racing for the same hour gets a conflict
    let mut racing = request;
    racing.candidate_email = "grace@example.com".to_string();
    let outcome = scheduler.book_interview(racing).await;
    assert_eq!(outcome.failure_reason(), Some(ErrorKind::SlotConflict));
    assert_eq!(store.created_events("primary").len(), 1);
    assert_eq!(notifier.recipients().len(), 2);
}

#[tokio::test]
async fn test_all_day_event_hides_whole_day() {
    let (scheduler, store, _notifier) = fixtures::create_scheduler();
    store.add_all_day_event("primary", "2025-04-10", "2025-04-11");
    let now = Utc.with_ymd_and_hms(2025, 4, 9, 6, 0, 0).unwrap();

    let slots = scheduler.get_free_slots_at(None, Some(3), now).await.unwrap();
    let days: Vec<u32> = slots
        .iter()
        .map(|s| chrono::Datelike::day(&s.start))
        .collect();
    assert_eq!(days, vec![9, 11]);
}
