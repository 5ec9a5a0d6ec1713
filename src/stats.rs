//! 时间轮统计计数器 (Timing Wheel Statistics Counters)
//!
//! 全部为原子计数器，监控线程无需任何协调即可读取快照。
//! (All counters are atomic; a monitoring thread can snapshot them without
//! any coordination)

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// 原子统计计数器块 (Atomic statistics counter block)
///
/// 由时间轮和所有句柄通过 `Arc` 共享。写入只来自驱动线程，
/// 但每个计数器的更新都独立正确，单写者假设放宽后依然成立。
/// (Shared via `Arc` between the wheel and all handles. Writes come from the
/// driver thread only, but every counter update is independently correct and
/// stays correct once the single-writer assumption is relaxed)
#[derive(Debug, Default)]
pub(crate) struct WheelStats {
    /// 当前被任意桶拥有的定时器数量
    /// (Number of timers currently owned by any bucket)
    pub active_timers: AtomicUsize,
    pub total_scheduled: AtomicU64,
    pub total_executed: AtomicU64,
    pub total_cancelled: AtomicU64,
    /// 回调 panic 的次数 (Number of callbacks that panicked)
    pub total_failed: AtomicU64,
    pub total_execution_time_ns: AtomicU64,
    pub max_execution_time_ns: AtomicU64,
}

impl WheelStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 记录一次成功执行的耗时，维护累计值和最大值
    /// (Record one successful execution, maintaining the running total and
    /// the peak)
    pub(crate) fn record_execution(&self, execution_time_ns: u64) {
        self.total_executed.fetch_add(1, Ordering::Relaxed);
        self.total_execution_time_ns
            .fetch_add(execution_time_ns, Ordering::Relaxed);

        // CAS 重试循环维护运行最大值，并发更新下仍然正确
        // (CAS retry loop keeps the running maximum correct under
        // concurrent updates)
        let mut current_max = self.max_execution_time_ns.load(Ordering::Relaxed);
        while execution_time_ns > current_max {
            match self.max_execution_time_ns.compare_exchange_weak(
                current_max,
                execution_time_ns,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current_max = observed,
            }
        }
    }

    /// 生成一致性要求宽松的只读快照 (Produce a loosely consistent snapshot)
    pub(crate) fn snapshot(&self) -> Statistics {
        let total_executed = self.total_executed.load(Ordering::Relaxed);
        let total_time = self.total_execution_time_ns.load(Ordering::Relaxed);
        let avg_execution_time_ns = if total_executed > 0 {
            total_time as f64 / total_executed as f64
        } else {
            0.0
        };

        Statistics {
            total_scheduled: self.total_scheduled.load(Ordering::Relaxed),
            total_executed,
            total_cancelled: self.total_cancelled.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
            avg_execution_time_ns,
            max_execution_time_ns: self.max_execution_time_ns.load(Ordering::Relaxed),
        }
    }
}

/// 统计信息快照 (Statistics snapshot)
///
/// 所有字段读取自原子计数器，字段之间不保证是同一瞬间的值。
/// (Every field is read from an atomic counter; fields are not guaranteed to
/// come from the same instant)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// 累计调度数量 (Total timers scheduled)
    pub total_scheduled: u64,
    /// 累计成功执行数量 (Total callbacks executed successfully)
    pub total_executed: u64,
    /// 累计取消数量 (Total timers cancelled)
    pub total_cancelled: u64,
    /// 累计执行失败（panic）数量 (Total failed, panicking, executions)
    pub total_failed: u64,
    /// 平均执行耗时（纳秒）(Average execution time in nanoseconds)
    pub avg_execution_time_ns: f64,
    /// 最大执行耗时（纳秒）(Peak execution time in nanoseconds)
    pub max_execution_time_ns: u64,
}
