// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_booking, create_test_course, instant, test_now};
use crate::{
    BookingCodeGenerator, BookingConfig, CacheKv, Clock, CoordinateGeocoder, Geocoder,
    LocationResolver, ManualClock, MemoryCache, NotificationEvent, Notifier, RandomCodeGenerator,
    RecordingNotifier, SequenceCodeGenerator, expiry_reminder_key, pending_expiry_window,
    reminder_key_ttl, review_open_cutoff, session_reminder_key,
};
use chrono::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tutor_booking_domain::{
    BookingCode, BookingStatus, CODE_ALPHABET, ClassType, Coordinates, NotificationKind, StudentId,
    Timezone, UserId,
};

#[test]
fn test_manual_clock_advances() {
    let clock = ManualClock::new(test_now());
    clock.advance(Duration::minutes(90));
    assert_eq!(clock.now(), instant(2026, 3, 2, 2, 30));
    clock.set(test_now());
    assert_eq!(clock.now(), test_now());
}

#[test]
fn test_memory_cache_expires_entries() {
    let cache = MemoryCache::new();
    cache.set("k", String::from("v"), Duration::minutes(10), test_now());

    assert_eq!(
        cache.get("k", test_now() + Duration::minutes(9)).as_deref(),
        Some("v")
    );
    assert!(!cache.contains("k", test_now() + Duration::minutes(10)));

    cache.cleanup_expired(test_now() + Duration::minutes(11));
    assert!(cache.is_empty());
}

#[test]
fn test_reminder_keys_are_namespaced() {
    assert_eq!(expiry_reminder_key("abc"), "reminder-expired-booking:abc");
    assert_eq!(session_reminder_key("abc"), "reminder-course-booking:abc");
}

#[test]
fn test_random_codes_match_format_and_local_date() {
    let generator = RandomCodeGenerator;
    // 18:00 UTC on March 2 is already March 3 in WIB.
    let at = instant(2026, 3, 2, 18, 0);
    for _ in 0..200 {
        let code = generator.generate(at, Timezone::Wib).unwrap();
        assert!(code.as_str().starts_with("BK20260303"));
        assert!(BookingCode::parse(code.as_str()).is_ok());
    }
}

#[test]
fn test_random_codes_draw_from_the_whole_alphabet() {
    let generator = RandomCodeGenerator;
    let mut seen = std::collections::HashSet::new();
    for _ in 0..2_000 {
        let code = generator.generate(test_now(), Timezone::Wib).unwrap();
        seen.extend(code.as_str().bytes().skip(10));
    }
    assert_eq!(seen.len(), CODE_ALPHABET.len());
    assert!(seen.iter().all(|byte| CODE_ALPHABET.contains(byte)));
}

#[test]
fn test_sequence_generator_repeats_last_suffix() {
    let generator = SequenceCodeGenerator::new(["AAAAA", "BBBBB"]);
    let first = generator.generate(test_now(), Timezone::Wib).unwrap();
    let second = generator.generate(test_now(), Timezone::Wib).unwrap();
    let third = generator.generate(test_now(), Timezone::Wib).unwrap();
    assert_eq!(first.as_str(), "BK20260302AAAAA");
    assert_eq!(second.as_str(), "BK20260302BBBBB");
    assert_eq!(third, second);
}

struct CountingGeocoder {
    calls: AtomicUsize,
}

impl Geocoder for CountingGeocoder {
    fn describe(&self, point: Coordinates) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CoordinateGeocoder.describe(point)
    }
}

#[test]
fn test_location_resolver_reads_through_cache() {
    let geocoder = Arc::new(CountingGeocoder {
        calls: AtomicUsize::new(0),
    });
    let resolver = LocationResolver::new(
        geocoder.clone(),
        Arc::new(MemoryCache::new()),
        Duration::hours(1),
    );
    let point = Coordinates::from_parts(Some(-6.2), Some(106.816_666)).unwrap();

    let first = resolver.resolve(point, test_now());
    let second = resolver.resolve(point, test_now() + Duration::minutes(5));

    assert_eq!(first.as_deref(), Some("-6.200000, 106.816666"));
    assert_eq!(first, second);
    assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_recording_notifier_counts_by_kind() {
    let course = create_test_course(ClassType::All, false);
    let booking = create_test_booking(
        StudentId::generate(),
        &course,
        BookingStatus::Pending,
        test_now(),
    );
    let notifier = RecordingNotifier::new();
    let tutor_user = UserId::generate();
    notifier
        .notify(NotificationEvent::booking_created(&booking, tutor_user))
        .unwrap();
    notifier
        .notify(NotificationEvent::pending_expiry_reminder(
            &booking,
            tutor_user,
            Some("Jakarta"),
        ))
        .unwrap();

    assert_eq!(notifier.count(NotificationKind::StudentBookingCreated), 1);
    let events = notifier.events();
    assert_eq!(events.len(), 2);
    assert!(events[1].body.contains("Jakarta"));
    assert_eq!(events[0].recipient, tutor_user);

    let record = events[0].to_record(test_now());
    assert_eq!(record.kind, NotificationKind::StudentBookingCreated);
    assert_eq!(record.booking_id, Some(booking.id));
    assert!(!record.is_read());
}

#[test]
fn test_reaction_windows() {
    let config = BookingConfig::default();
    let window = pending_expiry_window(test_now(), &config).unwrap();
    assert!(window.contains(test_now()));
    assert!(window.contains(test_now() + Duration::hours(1)));
    assert!(!window.contains(test_now() + Duration::minutes(61)));

    assert_eq!(
        review_open_cutoff(test_now(), &config).unwrap(),
        test_now() - Duration::hours(2)
    );
}

#[test]
fn test_reminder_ttl_covers_target_plus_grace() {
    let grace = Duration::minutes(5);
    assert_eq!(
        reminder_key_ttl(test_now() + Duration::minutes(30), test_now(), grace),
        Duration::minutes(35)
    );
    assert_eq!(
        reminder_key_ttl(test_now() - Duration::minutes(1), test_now(), grace),
        grace
    );
}

#[test]
fn test_config_validation() {
    assert!(BookingConfig::default().validate().is_ok());
    let bad = BookingConfig {
        expired_duration: Duration::zero(),
        ..BookingConfig::default()
    };
    assert!(bad.validate().is_err());
    let bad = BookingConfig {
        code_retry_limit: 0,
        ..BookingConfig::default()
    };
    assert!(bad.validate().is_err());
}
