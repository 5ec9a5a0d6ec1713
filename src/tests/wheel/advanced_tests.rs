//! 索引一致性与统计的进阶测试
//! (Advanced tests for index consistency and statistics)

use crate::{ManualClock, TimeWheel, WheelConfig};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn micro_wheel() -> (Arc<ManualClock>, TimeWheel) {
    let clock = Arc::new(ManualClock::new());
    let wheel = TimeWheel::new(WheelConfig::default(), clock.clone());
    (clock, wheel)
}

#[test]
fn test_cancel_half_of_shared_bucket() {
    // 同一桶内大量任务，交替取消后剩余任务全部正常触发
    // (Many timers in one bucket; after cancelling alternate ones the rest
    // all fire)
    let (clock, mut wheel) = micro_wheel();
    let incr = Arc::new(AtomicU32::new(0));

    let mut ids = Vec::new();
    for _ in 0..64 {
        let incr_clone = Arc::clone(&incr);
        ids.push(wheel.schedule_once(Duration::from_micros(100), move || {
            incr_clone.fetch_add(1, Ordering::SeqCst);
        }));
    }

    for id in ids.iter().step_by(2) {
        assert!(wheel.cancel_timer(*id));
    }
    assert_eq!(wheel.active_timer_count(), 32);

    clock.advance(Duration::from_micros(200));
    let executed = wheel.tick();

    assert_eq!(executed, 32);
    assert_eq!(incr.load(Ordering::SeqCst), 32);
    assert_eq!(wheel.statistics().total_cancelled, 32);
}

#[test]
fn test_interleaved_schedule_cancel_tick() {
    // 调度、取消、tick 交错进行，索引始终一致
    // (Interleaving schedule/cancel/tick keeps the index consistent)
    let (clock, mut wheel) = micro_wheel();
    let incr = Arc::new(AtomicU32::new(0));
    let mut pending = Vec::new();

    for round in 0..20u64 {
        for i in 0..10u64 {
            let incr_clone = Arc::clone(&incr);
            let id = wheel.schedule_once(Duration::from_micros(50 + i * 37), move || {
                incr_clone.fetch_add(1, Ordering::SeqCst);
            });
            pending.push(id);
        }

        // 每轮取消最近调度的两个任务（可能已触发，取消则返回 false）
        // (Cancel the two most recently scheduled timers each round; ones
        // that already fired just return false)
        for _ in 0..2 {
            if let Some(id) = pending.pop() {
                wheel.cancel_timer(id);
            }
        }

        clock.advance(Duration::from_micros(40 + round * 3));
        wheel.tick();
    }

    // 收尾：让剩余任务全部到期 (Let everything left expire)
    clock.advance(Duration::from_millis(2));
    wheel.tick();

    let stats = wheel.statistics();
    assert_eq!(stats.total_scheduled, 200);
    assert_eq!(
        stats.total_executed + stats.total_cancelled,
        200,
        "every timer either fired or was cancelled"
    );
    assert_eq!(wheel.active_timer_count(), 0);
    assert!(wheel.is_empty());
}

#[test]
fn test_cancel_at_coarse_level_and_after_cascade() {
    // 粗粒度层中等待的任务、以及已级联到细层的任务都能取消
    // (Cancels work both while a timer waits in a coarse level and after it
    // has cascaded into a finer one)
    let (clock, mut wheel) = micro_wheel();

    let id_coarse = wheel.schedule_once(Duration::from_millis(50), || {
        panic!("cancelled timer must not fire");
    });
    let id_fine = wheel.schedule_once(Duration::from_millis(50), || {
        panic!("cancelled timer must not fire");
    });

    // 10ms 后两个任务都还在第 1 层 (After 10ms both still sit in level 1)
    clock.advance(Duration::from_millis(10));
    wheel.tick();
    assert!(wheel.cancel_timer(id_coarse));

    // 49.95ms 时剩下的那个已级联到第 0 层
    // (At 49.95ms the remaining one has cascaded into level 0)
    clock.advance(Duration::from_micros(39_950));
    wheel.tick();
    assert!(wheel.cancel_timer(id_fine));

    clock.advance(Duration::from_millis(100));
    assert_eq!(wheel.tick(), 0);
    assert_eq!(wheel.statistics().total_failed, 0);
    assert_eq!(wheel.statistics().total_cancelled, 2);
}

#[test]
fn test_execution_time_statistics_deterministic() {
    // 回调推进手动时钟，得到确定性的执行耗时统计
    // (The callback advances the manual clock, giving deterministic
    // execution-time statistics)
    let (clock, mut wheel) = micro_wheel();

    let clock_fast = Arc::clone(&clock);
    wheel.schedule_once(Duration::from_micros(10), move || {
        clock_fast.advance(Duration::from_nanos(2_000));
    });
    let clock_slow = Arc::clone(&clock);
    wheel.schedule_once(Duration::from_micros(20), move || {
        clock_slow.advance(Duration::from_nanos(6_000));
    });

    clock.advance(Duration::from_micros(50));
    wheel.tick();

    let stats = wheel.statistics();
    assert_eq!(stats.total_executed, 2);
    assert_eq!(stats.max_execution_time_ns, 6_000);
    assert_eq!(stats.avg_execution_time_ns, 4_000.0);
}

#[test]
fn test_scheduler_handle_from_another_thread() {
    // 其他线程通过句柄调度，驱动线程在下一个 tick 物化并执行
    // (Another thread schedules through the handle; the driver thread
    // materialises and fires it on the next tick)
    let (clock, mut wheel) = micro_wheel();
    let incr = Arc::new(AtomicU32::new(0));

    let scheduler = wheel.scheduler();
    let incr_clone = Arc::clone(&incr);
    let handle = std::thread::spawn(move || {
        scheduler.schedule_once(Duration::from_micros(100), move || {
            incr_clone.fetch_add(1, Ordering::SeqCst);
        })
    });
    let id = handle.join().unwrap();

    assert_eq!(wheel.active_timer_count(), 1);

    clock.advance(Duration::from_micros(200));
    assert_eq!(wheel.tick(), 1);
    assert_eq!(incr.load(Ordering::SeqCst), 1);
    assert!(id.as_u64() >= 1);
}

#[test]
fn test_deferred_timer_is_cancellable() {
    // 句柄调度后尚未物化的任务也能取消
    // (A handle-scheduled timer cancels even before materialisation)
    let (clock, mut wheel) = micro_wheel();

    let scheduler = wheel.scheduler();
    let id = scheduler.schedule_once(Duration::from_micros(100), || {
        panic!("cancelled timer must not fire");
    });

    assert!(wheel.cancel_timer(id));
    assert!(!wheel.cancel_timer(id));

    clock.advance(Duration::from_millis(1));
    assert_eq!(wheel.tick(), 0);
    assert_eq!(wheel.statistics().total_failed, 0);
}

#[test]
fn test_ten_thousand_timers_across_levels() {
    // 大规模混合延迟：全部触发，计数归零
    // (Large mixed-delay batch: everything fires, counters return to zero)
    let (clock, mut wheel) = micro_wheel();
    let incr = Arc::new(AtomicU32::new(0));
    const TIMER_COUNT: u32 = 10_000;

    for i in 0..TIMER_COUNT {
        let incr_clone = Arc::clone(&incr);
        // 1µs 到 10ms 的混合延迟 (Mixed delays from 1µs to 10ms)
        let delay = Duration::from_micros(1 + (i as u64 * 7) % 10_000);
        wheel.schedule_once(delay, move || {
            incr_clone.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert_eq!(wheel.active_timer_count(), TIMER_COUNT as usize);

    // 以 1ms 为步长推进 11ms (Advance 11ms in 1ms steps)
    for _ in 0..11 {
        clock.advance(Duration::from_millis(1));
        wheel.tick();
    }

    assert_eq!(incr.load(Ordering::SeqCst), TIMER_COUNT);
    assert_eq!(wheel.active_timer_count(), 0);
    assert_eq!(wheel.statistics().total_executed, u64::from(TIMER_COUNT));
}
