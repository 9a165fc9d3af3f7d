//! Relay behaviour with emitters on several threads and re-entrant observers.

use parking_lot::Mutex;
use pausable_relay::{observer, pausable, subject, Notification, Subscription};
use std::sync::Arc;
use std::thread;

#[test]
fn test_source_and_control_on_separate_threads() {
    const COUNT: i64 = 20_000;

    let (items, source) = subject::<i64>();
    let (manager, control) = subject::<bool>();
    let (observer, rx) = observer::channel::<i64>();
    let relay = pausable(source, control).subscribe_handle(observer);

    let producer = thread::spawn(move || {
        for i in 0..COUNT {
            items.next(i).unwrap();
        }
        items
    });
    let toggler = {
        let manager = manager.clone();
        thread::spawn(move || {
            for i in 0..2_000 {
                manager.next(i % 2 == 0).unwrap();
                thread::yield_now();
            }
        })
    };

    let items = producer.join().unwrap();
    toggler.join().unwrap();
    manager.next(false).unwrap();
    items.complete().unwrap();

    let delivered: Vec<i64> = rx.try_iter().filter_map(Notification::into_value).collect();
    assert_eq!(delivered, (0..COUNT).collect::<Vec<_>>());

    let stats = relay.stats();
    assert_eq!(stats.delivered, COUNT as u64);
    assert_eq!(stats.discarded, 0);
}

#[test]
fn test_concurrent_subscribers_each_get_full_sequence() {
    let (items, source) = subject::<u32>();
    let (manager, control) = subject::<bool>();
    let relay = pausable(source, control);

    let receivers: Vec<_> = (0..4)
        .map(|_| {
            let (observer, rx) = observer::channel::<u32>();
            (relay.subscribe_handle(observer), rx)
        })
        .collect();

    let producer = thread::spawn(move || {
        for i in 0..1_000 {
            items.next(i).unwrap();
        }
    });
    for i in 0..100 {
        manager.next(i % 3 == 0).unwrap();
    }
    producer.join().unwrap();
    manager.next(false).unwrap();

    for (handle, rx) in receivers {
        let seen: Vec<u32> = rx.try_iter().filter_map(Notification::into_value).collect();
        assert_eq!(seen, (0..1_000).collect::<Vec<_>>());
        handle.unsubscribe();
    }
}

#[test]
fn test_observer_can_pause_from_callback() {
    let (items, source) = subject::<i32>();
    let (manager, control) = subject::<bool>();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let pauser = manager.clone();
    let observer = observer::from_fn(move |n: Notification<i32>| {
        if let Notification::Next(value) = n {
            sink.lock().push(value);
            if value == 1 {
                pauser.next(true).unwrap();
            }
        }
    });
    let relay = pausable(source, control).subscribe_handle(observer);

    items.next(1).unwrap();
    items.next(2).unwrap();
    assert_eq!(*seen.lock(), vec![1]);
    assert_eq!(relay.stats().buffered, 1);

    manager.next(false).unwrap();
    assert_eq!(*seen.lock(), vec![1, 2]);
}

#[test]
fn test_observer_can_unsubscribe_from_callback() {
    let (items, source) = subject::<i32>();
    let (manager, control) = subject::<bool>();

    let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let observer = {
        let slot = slot.clone();
        let seen = seen.clone();
        observer::from_fn(move |n: Notification<i32>| {
            if let Notification::Next(value) = n {
                seen.lock().push(value);
                if value == 2 {
                    let subscription = slot.lock().clone();
                    if let Some(subscription) = subscription {
                        subscription.unsubscribe();
                    }
                }
            }
        })
    };
    let relay = pausable(source, control).subscribe_handle(observer);
    *slot.lock() = Some(relay.clone().into_subscription());

    // Values 1..=3 are replayed in one go; the callback stops the replay at 2.
    manager.next(true).unwrap();
    for i in 1..=3 {
        items.next(i).unwrap();
    }
    manager.next(false).unwrap();
    items.next(4).unwrap();

    assert_eq!(*seen.lock(), vec![1, 2]);
    assert!(relay.is_closed());
    assert_eq!(items.subscriber_count(), 0);
    assert_eq!(manager.subscriber_count(), 0);
}

#[test]
fn test_reentrant_source_emission_keeps_order() {
    let (items, source) = subject::<i32>();
    let (_manager, control) = subject::<bool>();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let echo = items.clone();
    let observer = observer::from_fn(move |n: Notification<i32>| {
        if let Notification::Next(value) = n {
            sink.lock().push(value);
            if value < 3 {
                // Queued behind the value being delivered, never nested.
                echo.next(value + 10).unwrap();
            }
        }
    });
    let _relay = pausable(source, control).subscribe_handle(observer);

    items.next(1).unwrap();

    assert_eq!(*seen.lock(), vec![1, 11]);
}

#[test]
fn test_unsubscribe_while_producer_runs_releases_everything() {
    let (items, source) = subject::<u32>();
    let (manager, control) = subject::<bool>();
    let (observer, rx) = observer::channel::<u32>();
    let relay = pausable(source, control).subscribe_handle(observer);

    let producer = {
        let items = items.clone();
        thread::spawn(move || {
            for i in 0..10_000 {
                items.next(i).unwrap();
            }
        })
    };
    thread::yield_now();
    relay.unsubscribe();
    producer.join().unwrap();

    // Whoever held the gate ran the teardown before the producer finished.
    assert!(relay.is_closed());
    assert!(!relay.is_connected());
    assert_eq!(items.subscriber_count(), 0);
    assert_eq!(manager.subscriber_count(), 0);

    let seen: Vec<u32> = rx.try_iter().filter_map(Notification::into_value).collect();
    assert_eq!(seen, (0..seen.len() as u32).collect::<Vec<_>>());
}
