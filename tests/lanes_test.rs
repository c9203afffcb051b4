//! Integration tests for lane behavior observed through the facade.
//!
//! These tests validate:
//! - Main-lane FIFO ordering
//! - Pool isolation (background bulk work cannot starve normal work)
//! - Panic containment at the lane boundary
//! - The known main-lane stall when a task hangs (no task timeouts exist)

use lane_scheduler::builders::build_scheduler;
use lane_scheduler::config::SchedulerConfig;
use lane_scheduler::core::{Priority, Scheduler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

fn make_scheduler(general: usize, background: usize) -> Scheduler {
    lane_scheduler::util::init_tracing();
    let config = SchedulerConfig::new()
        .with_general_workers(general)
        .with_background_workers(background);
    build_scheduler(&config).expect("failed to build scheduler")
}

fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn test_main_lane_is_fifo() {
    let scheduler = make_scheduler(2, 1);
    let order = Arc::new(Mutex::new(Vec::new()));

    // Same readiness for all: ordering falls to the insertion sequence, and
    // the single main-lane thread preserves it end to end.
    for i in 0..6 {
        let order = Arc::clone(&order);
        scheduler.submit_delayed(
            &format!("high-{i}"),
            Priority::High,
            Duration::from_millis(50),
            move || {
                order.lock().unwrap().push(i);
            },
        );
    }

    assert!(wait_until(Duration::from_secs(2), || order.lock().unwrap().len() == 6));
    assert_eq!(*order.lock().unwrap(), (0..6).collect::<Vec<_>>());
    scheduler.shutdown();
}

#[test]
fn test_background_bulk_work_does_not_starve_normal() {
    let scheduler = make_scheduler(1, 1);
    let normal_done = Arc::new(AtomicUsize::new(0));

    // Saturate the background lane with long-running bulk work.
    for i in 0..4 {
        scheduler.submit(&format!("bulk-{i}"), Priority::Background, || {
            thread::sleep(Duration::from_millis(200));
        });
    }

    let start = Instant::now();
    let normal_clone = Arc::clone(&normal_done);
    scheduler.submit("interactive", Priority::Normal, move || {
        normal_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert!(wait_until(Duration::from_secs(2), || normal_done.load(Ordering::SeqCst) == 1));
    assert!(
        start.elapsed() < Duration::from_millis(200),
        "normal work ran without waiting behind background bulk"
    );
    scheduler.shutdown();
}

#[test]
fn test_panicking_task_does_not_stop_dispatch() {
    let scheduler = make_scheduler(1, 1);
    let survived = Arc::new(AtomicUsize::new(0));

    scheduler.submit("explodes", Priority::Normal, || {
        panic!("task failure");
    });
    let survived_clone = Arc::clone(&survived);
    scheduler.submit("next", Priority::Normal, move || {
        survived_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert!(wait_until(Duration::from_secs(2), || survived.load(Ordering::SeqCst) == 1));
    assert!(wait_until(Duration::from_secs(2), || scheduler.active_count() == 0));

    // The same worker keeps serving jobs after containing the panic.
    let survived_clone = Arc::clone(&survived);
    scheduler.submit("again", Priority::Normal, move || {
        survived_clone.fetch_add(1, Ordering::SeqCst);
    });
    assert!(wait_until(Duration::from_secs(2), || survived.load(Ordering::SeqCst) == 2));
    scheduler.shutdown();
}

#[test]
fn test_panicking_periodic_fires_again_next_period() {
    let scheduler = make_scheduler(1, 1);
    let attempts = Arc::new(AtomicUsize::new(0));

    let attempts_clone = Arc::clone(&attempts);
    assert!(scheduler.submit_periodic(
        "flaky",
        Duration::from_millis(20),
        Duration::from_millis(30),
        move || {
            attempts_clone.fetch_add(1, Ordering::SeqCst);
            panic!("periodic failure");
        }
    ));

    // No retry policy; the next period simply fires again.
    assert!(wait_until(Duration::from_secs(3), || attempts.load(Ordering::SeqCst) >= 3));
    assert!(scheduler.cancel_periodic("flaky"));
    scheduler.shutdown();
}

#[test]
fn test_hung_main_lane_task_stalls_the_lane() {
    // Known limitation, reproduced deliberately: no timeouts exist, so a hung
    // high-priority task delays everything behind it on the main lane while
    // other lanes keep flowing.
    let scheduler = make_scheduler(1, 1);
    let events = Arc::new(Mutex::new(Vec::new()));

    let start = Instant::now();
    let events_hog = Arc::clone(&events);
    scheduler.submit("hog", Priority::High, move || {
        events_hog.lock().unwrap().push(("hog", Instant::now()));
        thread::sleep(Duration::from_millis(300));
    });
    let events_after = Arc::clone(&events);
    scheduler.submit("after", Priority::High, move || {
        events_after.lock().unwrap().push(("after", Instant::now()));
    });
    let events_normal = Arc::clone(&events);
    scheduler.submit("flows", Priority::Normal, move || {
        events_normal.lock().unwrap().push(("flows", Instant::now()));
    });

    assert!(wait_until(Duration::from_secs(2), || events.lock().unwrap().len() == 3));
    let events = events.lock().unwrap();
    let at = |name: &str| events.iter().find(|(n, _)| *n == name).unwrap().1;

    assert!(
        at("after") >= at("hog") + Duration::from_millis(280),
        "main lane stalled behind the hung task"
    );
    assert!(
        at("flows") < start + Duration::from_millis(250),
        "general lane unaffected by the main-lane stall"
    );
    scheduler.shutdown();
}
