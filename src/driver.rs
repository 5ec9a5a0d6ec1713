use crate::clock::TimeSource;
use crate::config::WheelConfig;
use crate::event::{TimerCallback, TimerId};
use crate::stats::Statistics;
use crate::wheel::{Scheduler, TimeWheel};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Timing wheel driver (时间轮驱动器)
///
/// 在后台 tokio 任务中以基础 tick 周期调用 [`TimeWheel::tick`]。
/// 回调仍然在 `tick` 内部、驱动任务的线程上同步执行：驱动器只提供
/// 周期唤醒，从不做异步分发；慢回调会推迟同一次 tick 中后续定时器的
/// 执行。需要更细粒度或完全确定性推进的调用方应自己持有 [`TimeWheel`]
/// 并直接驱动 `tick_at`。
/// (Calls [`TimeWheel::tick`] from a background tokio task at the base tick
/// period. Callbacks still run synchronously inside `tick` on the driver
/// task's thread: the driver only provides the periodic wake-up, never
/// async dispatch; a slow callback delays the remaining timers of that same
/// tick. Callers needing finer granularity or fully deterministic
/// advancement should own a [`TimeWheel`] and drive `tick_at` directly)
///
/// # Notes
/// 驱动器适合毫秒级 tick 的配置；亚微秒级的 tick 周期超出了运行时定时器
/// 的精度，落后的间隔由 `tick` 的补齐逻辑吸收。
/// (Suited to millisecond-scale tick configurations; sub-microsecond tick
/// periods exceed the runtime timer's precision, and late intervals are
/// absorbed by `tick`'s catch-up logic)
///
/// # Examples (示例)
/// ```no_run
/// use peregrine_timer::{MonotonicClock, TimerDriver, WheelConfig};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let config = WheelConfig::builder()
///         .tick_duration(Duration::from_millis(1))
///         .build()
///         .unwrap();
///     let driver = TimerDriver::new(config, Arc::new(MonotonicClock::new()));
///
///     // 周期刷新 gas 价格缓存 (periodic gas price cache refresh)
///     driver.schedule_recurring(Duration::from_millis(50), || {
///         // refresh_gas_price()
///     });
///
///     tokio::time::sleep(Duration::from_millis(200)).await;
///     driver.shutdown().await;
/// }
/// ```
pub struct TimerDriver {
    /// Wheel instance, shared with the background tick loop
    ///
    /// 时间轮实例，与后台 tick 循环共享
    wheel: Arc<Mutex<TimeWheel>>,

    /// Lock-free statistics and re-entrant scheduling handle
    ///
    /// 无锁统计与重入调度句柄
    scheduler: Scheduler,

    /// Background tick loop task handle
    ///
    /// 后台 tick 循环任务句柄
    tick_handle: Option<JoinHandle<()>>,
}

impl TimerDriver {
    /// Create a driver and start its background tick loop
    ///
    /// # Parameters
    /// - `config`: Wheel configuration, already validated
    /// - `clock`: Time source constructed once at process start
    ///
    /// 创建驱动器并启动后台 tick 循环
    ///
    /// # 参数
    /// - `config`: 时间轮配置，已验证
    /// - `clock`: 进程启动时构造一次的时间源
    pub fn new(config: WheelConfig, clock: Arc<dyn TimeSource>) -> Self {
        let tick_duration = config.tick_duration;
        let wheel = TimeWheel::new(config, clock);
        let scheduler = wheel.scheduler();
        let wheel = Arc::new(Mutex::new(wheel));
        let wheel_clone = Arc::clone(&wheel);

        // Start background tick loop
        // 启动后台 tick 循环
        let tick_handle = tokio::spawn(async move {
            Self::tick_loop(wheel_clone, tick_duration).await;
        });

        Self {
            wheel,
            scheduler,
            tick_handle: Some(tick_handle),
        }
    }

    /// Create a driver with the default configuration and the calibrated
    /// monotonic clock
    ///
    /// 使用默认配置和已校准的单调时钟创建驱动器
    pub fn with_defaults() -> Self {
        Self::new(
            WheelConfig::default(),
            Arc::new(crate::clock::MonotonicClock::new()),
        )
    }

    /// Schedule a one-shot timer
    ///
    /// # Returns
    /// Unique timer id for cancellation
    ///
    /// 调度一次性定时器
    ///
    /// # 返回值
    /// 用于取消的唯一定时器 ID
    pub fn schedule_once(&self, delay: Duration, callback: impl TimerCallback) -> TimerId {
        self.wheel.lock().schedule_once(delay, callback)
    }

    /// Schedule a recurring timer
    ///
    /// 调度周期性定时器
    pub fn schedule_recurring(&self, interval: Duration, callback: impl TimerCallback) -> TimerId {
        self.wheel.lock().schedule_recurring(interval, callback)
    }

    /// Cancel a pending timer
    ///
    /// # Returns
    /// `true` if the timer was still pending, `false` for an unknown or
    /// already-fired id
    ///
    /// # Notes
    /// Must not be called from inside a timer callback: the callback already
    /// runs under the wheel lock. Callbacks schedule through
    /// [`TimerDriver::scheduler`] instead.
    ///
    /// 取消尚未触发的定时器
    ///
    /// # 返回值
    /// 定时器仍在等待返回 `true`；未知或已触发的 ID 返回 `false`
    ///
    /// # 注意
    /// 不能在定时器回调内部调用：回调已经持有时间轮锁。回调应通过
    /// [`TimerDriver::scheduler`] 调度。
    pub fn cancel_timer(&self, timer_id: TimerId) -> bool {
        self.wheel.lock().cancel_timer(timer_id)
    }

    /// Cloneable handle for scheduling from inside callbacks and for
    /// lock-free statistics reads
    ///
    /// 可克隆句柄，用于回调内部调度与无锁统计读取
    pub fn scheduler(&self) -> Scheduler {
        self.scheduler.clone()
    }

    /// Lock-free statistics snapshot
    ///
    /// 无锁统计快照
    #[inline]
    pub fn statistics(&self) -> Statistics {
        self.scheduler.statistics()
    }

    /// Number of currently scheduled timers
    ///
    /// 当前已调度的定时器数量
    #[inline]
    pub fn active_timer_count(&self) -> usize {
        self.scheduler.active_timer_count()
    }

    /// Background tick loop: advance the wheel once per base tick; missed
    /// intervals are skipped and absorbed by the wheel's catch-up logic
    ///
    /// 后台 tick 循环：每个基础 tick 推进一次时间轮；错过的间隔被跳过，
    /// 由时间轮的补齐逻辑吸收
    async fn tick_loop(wheel: Arc<Mutex<TimeWheel>>, tick_duration: Duration) {
        tracing::debug!(?tick_duration, "timer driver started");

        let mut interval = tokio::time::interval(tick_duration);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            // Advance the wheel; due callbacks execute inline here
            // 推进时间轮；到期回调在此内联执行
            wheel.lock().tick();
        }
    }

    /// Graceful shutdown of the driver
    ///
    /// 优雅关闭驱动器
    ///
    /// # Examples (示例)
    /// ```no_run
    /// # use peregrine_timer::TimerDriver;
    /// # #[tokio::main]
    /// # async fn main() {
    /// let driver = TimerDriver::with_defaults();
    /// driver.shutdown().await;
    /// # }
    /// ```
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.tick_handle.take() {
            handle.abort();
            tracing::debug!("timer driver stopped");
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.tick_handle.take() {
            handle.abort();
        }
    }
}
