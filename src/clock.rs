//! 单调时钟抽象 (Monotonic Clock Abstraction)
//!
//! 时间轮唯一的外部时间依赖：一个返回单调纳秒时间戳的操作。
//! 默认实现基于 `quanta`，首次构造时完成一次 TSC/timebase 校准并缓存，
//! 之后的读取只做一次计数器读取和一次乘法换算。
//! (The wheel's only external time dependency: one operation returning a
//! monotonic nanosecond timestamp. The default implementation is backed by
//! `quanta`, which calibrates the TSC/timebase once on first construction
//! and caches the factor; later reads are one counter read plus one
//! multiplication)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 时间源特性 (Time Source Trait)
///
/// 实现此特性的类型可以为时间轮提供当前时间。时间戳只要求单调递增，
/// 不要求与挂钟时间对齐。
/// (Types implementing this trait provide the current time to the wheel.
/// Timestamps only need to be monotonic, not aligned with wall-clock time)
pub trait TimeSource: Send + Sync + 'static {
    /// 当前单调纳秒时间戳 (Current monotonic timestamp in nanoseconds)
    fn timestamp_ns(&self) -> u64;
}

/// 基于 `quanta` 的单调时钟 (Monotonic clock backed by `quanta`)
///
/// 构造时读取一次原始计数器作为原点，之后的时间戳都是相对原点的
/// 纳秒偏移。校准失败时 `quanta` 内部回退到操作系统的单调时钟，
/// 对调用者透明。
/// (Reads the raw counter once at construction as the origin; every later
/// timestamp is the nanosecond offset from that origin. If calibration is
/// unavailable `quanta` falls back to the OS monotonic clock internally,
/// transparently to the caller)
///
/// # 示例 (Examples)
/// ```
/// use peregrine_timer::{MonotonicClock, TimeSource};
///
/// let clock = MonotonicClock::new();
/// let a = clock.timestamp_ns();
/// let b = clock.timestamp_ns();
/// assert!(b >= a);
/// ```
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    clock: quanta::Clock,
    origin_raw: u64,
}

impl MonotonicClock {
    /// 创建新的单调时钟，完成一次性校准
    /// (Create a new monotonic clock, performing the one-time calibration)
    pub fn new() -> Self {
        let clock = quanta::Clock::new();
        let origin_raw = clock.raw();
        Self { clock, origin_raw }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    #[inline]
    fn timestamp_ns(&self) -> u64 {
        self.clock.delta_as_nanos(self.origin_raw, self.clock.raw())
    }
}

/// 手动时钟，用于确定性测试与仿真
/// (Manual clock for deterministic tests and simulation)
///
/// 时间只在调用 `advance`/`set_ns` 时前进，多线程可见。
/// (Time only moves on `advance`/`set_ns`, visible across threads)
///
/// # 示例 (Examples)
/// ```
/// use peregrine_timer::{ManualClock, TimeSource};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// assert_eq!(clock.timestamp_ns(), 0);
/// clock.advance(Duration::from_micros(5));
/// assert_eq!(clock.timestamp_ns(), 5_000);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ns: AtomicU64,
}

impl ManualClock {
    /// 创建从 0 开始的手动时钟 (Create a manual clock starting at 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置当前时间戳 (Set the current timestamp)
    pub fn set_ns(&self, ns: u64) {
        self.now_ns.store(ns, Ordering::Release);
    }

    /// 前进给定时长 (Advance by the given duration)
    pub fn advance(&self, by: std::time::Duration) {
        self.now_ns
            .fetch_add(by.as_nanos() as u64, Ordering::AcqRel);
    }
}

impl TimeSource for ManualClock {
    #[inline]
    fn timestamp_ns(&self) -> u64 {
        self.now_ns.load(Ordering::Acquire)
    }
}

/// 精度计时器，测量一段代码的耗时
/// (Precision timer measuring the elapsed time of a code section)
///
/// 构造时捕获起始时间戳；`elapsed_ns` 可以被调用任意多次，互不影响。
/// 纯测量，无任何释放义务。
/// (Captures the start timestamp at construction; `elapsed_ns` may be called
/// any number of times without side effects. Pure measurement, no cleanup
/// obligation)
pub struct PrecisionTimer {
    clock: Arc<dyn TimeSource>,
    start_ns: u64,
}

impl PrecisionTimer {
    /// 以给定时间源开始计时 (Start timing with the given time source)
    #[inline]
    pub fn start(clock: &Arc<dyn TimeSource>) -> Self {
        Self {
            clock: Arc::clone(clock),
            start_ns: clock.timestamp_ns(),
        }
    }

    /// 自计时开始以来经过的纳秒数
    /// (Nanoseconds elapsed since timing started)
    #[inline]
    pub fn elapsed_ns(&self) -> u64 {
        self.clock.timestamp_ns().saturating_sub(self.start_ns)
    }
}
