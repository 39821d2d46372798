// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use wq_core::{Clock, FakeClock};

const A: TimerId = TimerId::CrashDecay(1);
const B: TimerId = TimerId::CrashDecay(2);
const C: TimerId = TimerId::CrashDecay(3);

#[test]
fn scheduler_timer_lifecycle() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(A, Duration::from_secs(10), clock.now());
    assert!(scheduler.has_timers());
    assert!(scheduler.next_deadline().is_some());

    // Timer hasn't fired yet
    clock.advance(Duration::from_secs(5));
    assert!(scheduler.fired_timers(clock.now()).is_empty());
    assert!(scheduler.has_timers());

    // Timer fires
    clock.advance(Duration::from_secs(10));
    assert_eq!(scheduler.fired_timers(clock.now()), vec![A]);
    assert!(!scheduler.has_timers());
}

#[test]
fn scheduler_cancel_timer() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(A, Duration::from_secs(10), clock.now());
    scheduler.cancel_timer(A);

    clock.advance(Duration::from_secs(15));
    assert!(scheduler.fired_timers(clock.now()).is_empty());
}

#[test]
fn scheduler_cancel_all() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(A, Duration::from_secs(1), clock.now());
    scheduler.set_timer(B, Duration::from_secs(2), clock.now());
    scheduler.cancel_all();

    assert!(!scheduler.has_timers());
    assert!(scheduler.next_deadline().is_none());
}

#[test]
fn scheduler_next_deadline_returns_earliest() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(A, Duration::from_secs(30), clock.now());
    scheduler.set_timer(B, Duration::from_secs(10), clock.now());

    let expected = clock.now() + Duration::from_secs(10);
    assert_eq!(scheduler.next_deadline(), Some(expected));
}

#[test]
fn scheduler_overwrite_timer_resets_deadline() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(A, Duration::from_secs(10), clock.now());

    // Overwrite with a longer duration
    clock.advance(Duration::from_secs(2));
    scheduler.set_timer(A, Duration::from_secs(20), clock.now());

    clock.advance(Duration::from_secs(9));
    assert!(
        scheduler.fired_timers(clock.now()).is_empty(),
        "old timer deadline should be overwritten"
    );

    clock.advance(Duration::from_secs(12));
    assert_eq!(scheduler.fired_timers(clock.now()), vec![A]);
}

#[test]
fn scheduler_fires_expired_timers_in_deadline_order() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(B, Duration::from_secs(10), clock.now());
    scheduler.set_timer(A, Duration::from_secs(5), clock.now());
    scheduler.set_timer(C, Duration::from_secs(15), clock.now());

    clock.advance(Duration::from_secs(11));
    assert_eq!(scheduler.fired_timers(clock.now()), vec![A, B]);
    assert!(scheduler.has_timers(), "timer c should still be pending");

    clock.advance(Duration::from_secs(5));
    assert_eq!(scheduler.fired_timers(clock.now()), vec![C]);
}

#[test]
fn timer_ids_display() {
    assert_eq!(TimerId::CrashDecay(7).to_string(), "crash-decay:7");
}
