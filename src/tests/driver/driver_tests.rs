//! 驱动器测试 (Driver tests)
//!
//! 这些测试使用真实时钟和 tokio 运行时，时间断言都留有充分余量。
//! (These tests use the real clock and the tokio runtime; every timing
//! assertion leaves a generous margin)

use crate::{MonotonicClock, TimerDriver, WheelConfig};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn millisecond_driver() -> TimerDriver {
    let config = WheelConfig::builder()
        .tick_duration(Duration::from_millis(1))
        .build()
        .unwrap();
    TimerDriver::new(config, Arc::new(MonotonicClock::new()))
}

#[tokio::test]
async fn test_driver_basic_oneshot() {
    let driver = millisecond_driver();
    let counter = Arc::new(AtomicU32::new(0));

    let counter_clone = Arc::clone(&counter);
    driver.schedule_once(Duration::from_millis(20), move || {
        counter_clone.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(driver.active_timer_count(), 0);

    driver.shutdown().await;
}

#[tokio::test]
async fn test_driver_multiple_timers() {
    let driver = millisecond_driver();
    let counter = Arc::new(AtomicU32::new(0));

    // 创建 10 个定时器 (Create 10 timers)
    for i in 0..10 {
        let counter_clone = Arc::clone(&counter);
        driver.schedule_once(Duration::from_millis(5 * (i + 1)), move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
    }

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 10);

    driver.shutdown().await;
}

#[tokio::test]
async fn test_driver_cancellation() {
    let driver = millisecond_driver();
    let counter = Arc::new(AtomicU32::new(0));

    // 创建 5 个定时器，取消前 3 个 (Create 5 timers, cancel the first 3)
    let mut ids = Vec::new();
    for _ in 0..5 {
        let counter_clone = Arc::clone(&counter);
        ids.push(driver.schedule_once(Duration::from_millis(100), move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        }));
    }

    for id in &ids[0..3] {
        assert!(driver.cancel_timer(*id));
    }

    tokio::time::sleep(Duration::from_millis(300)).await;
    // 只有 2 个定时器应该被触发 (Only 2 timers should have fired)
    assert_eq!(counter.load(Ordering::SeqCst), 2);

    let stats = driver.statistics();
    assert_eq!(stats.total_scheduled, 5);
    assert_eq!(stats.total_cancelled, 3);
    assert_eq!(stats.total_executed, 2);

    driver.shutdown().await;
}

#[tokio::test]
async fn test_driver_recurring_heartbeat() {
    let driver = millisecond_driver();
    let counter = Arc::new(AtomicU32::new(0));

    let counter_clone = Arc::clone(&counter);
    let id = driver.schedule_recurring(Duration::from_millis(10), move || {
        counter_clone.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(500)).await;

    // 500ms / 10ms：名义 50 次，调度抖动下限宽松
    // (500ms / 10ms: nominally 50 fires, loose lower bound under scheduling
    // jitter)
    let fired = counter.load(Ordering::SeqCst);
    assert!(fired >= 20, "heartbeat fired only {} times", fired);
    assert_eq!(driver.active_timer_count(), 1);

    assert!(driver.cancel_timer(id));
    let fired_at_cancel = counter.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(counter.load(Ordering::SeqCst), fired_at_cancel);

    driver.shutdown().await;
}

#[tokio::test]
async fn test_driver_reentrant_schedule_via_handle() {
    let driver = millisecond_driver();
    let counter = Arc::new(AtomicU32::new(0));

    // 回调内通过句柄调度后续任务 (The callback schedules a follow-up
    // through the handle)
    let scheduler = driver.scheduler();
    let counter_outer = Arc::clone(&counter);
    driver.schedule_once(Duration::from_millis(10), move || {
        let counter_inner = Arc::clone(&counter_outer);
        scheduler.schedule_once(Duration::from_millis(10), move || {
            counter_inner.fetch_add(1, Ordering::SeqCst);
        });
    });

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(driver.active_timer_count(), 0);

    driver.shutdown().await;
}

#[tokio::test]
async fn test_driver_statistics_from_monitor_task() {
    let driver = millisecond_driver();

    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = Arc::clone(&counter);
    driver.schedule_recurring(Duration::from_millis(5), move || {
        counter_clone.fetch_add(1, Ordering::SeqCst);
    });

    // 独立监控任务轮询统计，不与驱动协调
    // (An independent monitoring task polls statistics without coordinating
    // with the driver)
    let scheduler = driver.scheduler();
    let monitor = tokio::spawn(async move {
        let mut last_executed = 0;
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let stats = scheduler.statistics();
            assert!(stats.total_executed >= last_executed);
            last_executed = stats.total_executed;
        }
        last_executed
    });

    let executed = monitor.await.unwrap();
    assert!(executed > 0);

    driver.shutdown().await;
}
