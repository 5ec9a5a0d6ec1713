use crate::clock::{PrecisionTimer, TimeSource};
use crate::config::WheelConfig;
use crate::event::{CallbackWrapper, TimerCallback, TimerEvent, TimerId, TimerKind, TimerLocation};
use crate::stats::{Statistics, WheelStats};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Timing wheel single level data structure
///
/// 时间轮单层数据结构
struct WheelLevel {
    /// Bucket array, each bucket owns a group of timer events
    ///
    /// 桶数组，每个桶拥有一组定时器事件
    buckets: Vec<Vec<TimerEvent>>,

    /// Current slot cursor
    ///
    /// 当前槽游标
    current_slot: usize,

    /// Duration of one tick of this level in nanoseconds
    ///
    /// 本层一个 tick 的纳秒数
    #[allow(dead_code)]
    tick_ns: u64,
}

impl WheelLevel {
    /// Create a new wheel level
    ///
    /// 创建一个新的时间轮层
    fn new(slot_count: usize, tick_ns: u64, bucket_capacity: usize) -> Self {
        let mut buckets = Vec::with_capacity(slot_count);
        // Pre-reserve bucket capacity so the common scheduling path does not
        // allocate
        //
        // 预分配桶容量，常规调度路径上不产生分配
        for _ in 0..slot_count {
            buckets.push(Vec::with_capacity(bucket_capacity));
        }

        Self {
            buckets,
            current_slot: 0,
            tick_ns,
        }
    }
}

/// State shared between the wheel, its scheduler handles and monitoring
/// threads
///
/// 时间轮、调度句柄与监控线程共享的状态
pub(crate) struct WheelShared {
    /// Timer id allocator, starts at 1
    ///
    /// 定时器 ID 分配器，从 1 开始
    next_timer_id: AtomicU64,

    /// Atomic statistics, readable without locks
    ///
    /// 原子统计计数器，无锁读取
    pub(crate) stats: WheelStats,

    /// Deferred insertions from scheduler handles; drained at tick
    /// boundaries so a callback may schedule without touching the bucket
    /// currently being scanned
    ///
    /// 调度句柄的延迟插入队列；在 tick 边界排空，
    /// 回调因此可以在不触碰正在扫描的桶的情况下调度新任务
    deferred: Mutex<Vec<TimerEvent>>,
}

/// Cloneable scheduling handle
///
/// 可克隆的调度句柄
///
/// `Scheduler` 是回调内部重入调度的唯一入口：插入被推迟到当前桶扫描
/// 结束之后，由 `tick` 在安全的边界物化。句柄同时提供无锁的统计读取，
/// 监控线程无需与驱动线程协调。
/// (The only entry point for re-entrant scheduling from inside a callback:
/// insertion is deferred past the current bucket scan and materialised by
/// `tick` at a safe boundary. The handle also offers lock-free statistics
/// reads, so a monitoring thread needs no coordination with the driver)
///
/// # Examples (示例)
/// ```
/// use peregrine_timer::{ManualClock, TimeWheel, WheelConfig};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = Arc::new(ManualClock::new());
/// let wheel = TimeWheel::new(WheelConfig::default(), clock);
///
/// let scheduler = wheel.scheduler();
/// let id = scheduler.schedule_once(Duration::from_micros(100), || {});
/// assert!(id.as_u64() > 0);
/// ```
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<WheelShared>,
    clock: Arc<dyn TimeSource>,
}

impl Scheduler {
    /// Schedule a one-shot timer (deferred insertion)
    ///
    /// # Parameters
    /// - `delay`: Delay before the callback fires
    /// - `callback`: Zero-argument callback
    ///
    /// # Returns
    /// The timer id, usable with `TimeWheel::cancel_timer`
    ///
    /// 调度一次性定时器（延迟插入）
    ///
    /// # 参数
    /// - `delay`: 回调触发前的延迟
    /// - `callback`: 无参数回调
    ///
    /// # 返回值
    /// 定时器 ID，可用于 `TimeWheel::cancel_timer`
    pub fn schedule_once(&self, delay: Duration, callback: impl TimerCallback) -> TimerId {
        self.push(delay, TimerKind::OneShot, CallbackWrapper::new(callback))
    }

    /// Schedule a recurring timer (deferred insertion)
    ///
    /// 调度周期性定时器（延迟插入）
    pub fn schedule_recurring(&self, interval: Duration, callback: impl TimerCallback) -> TimerId {
        let interval_ns = interval.as_nanos() as u64;
        self.push(
            interval,
            TimerKind::Recurring { interval_ns },
            CallbackWrapper::new(callback),
        )
    }

    /// Lock-free statistics snapshot
    ///
    /// 无锁统计快照
    #[inline]
    pub fn statistics(&self) -> Statistics {
        self.shared.stats.snapshot()
    }

    /// Number of currently scheduled timers
    ///
    /// 当前已调度的定时器数量
    #[inline]
    pub fn active_timer_count(&self) -> usize {
        self.shared
            .stats
            .active_timers
            .load(Ordering::Relaxed)
    }

    fn push(&self, delay: Duration, kind: TimerKind, callback: CallbackWrapper) -> TimerId {
        let id = TimerId(self.shared.next_timer_id.fetch_add(1, Ordering::Relaxed));
        let expiry_ns = self
            .clock
            .timestamp_ns()
            .saturating_add(delay.as_nanos() as u64);

        self.shared
            .stats
            .total_scheduled
            .fetch_add(1, Ordering::Relaxed);
        self.shared
            .stats
            .active_timers
            .fetch_add(1, Ordering::Relaxed);

        self.shared
            .deferred
            .lock()
            .push(TimerEvent::new(id, expiry_ns, kind, callback));
        id
    }
}

/// Hierarchical timing wheel (分层时间轮)
///
/// `levels` 层，每层 `slots_per_level` 个桶；第 L 层的 tick 是基础 tick 的
/// `slots_per_level^L` 倍。短延迟落在细粒度低层，长延迟落在粗粒度高层，
/// 随着到期时间临近通过级联迁移到更细的层。
/// (`levels` levels of `slots_per_level` buckets each; the tick of level L is
/// the base tick times `slots_per_level^L`. Short delays land in the
/// fine-grained low levels, long delays in the coarse high levels, and
/// migrate to finer levels by cascading as their expiry approaches)
///
/// # 并发 (Concurrency)
///
/// `schedule_once` / `schedule_recurring` / `cancel_timer` / `tick` 都要求
/// `&mut self`：单写者约束由借用检查器强制。回调在 `tick` 内部、调用线程上
/// 同步执行，没有分发，没有超时，慢回调会阻塞本次 `tick` 的后续推进。
/// 这是刻意的低开销取舍，不要用异步分发“修复”。统计计数器可以通过
/// [`Scheduler`] 在其他线程无锁读取。
/// (All mutating operations take `&mut self`: the single-writer discipline is
/// enforced by the borrow checker. Callbacks run synchronously and inline on
/// the calling thread inside `tick`, with no dispatch and no timeout; a slow
/// callback stalls the remainder of that `tick`. This is a deliberate
/// low-overhead trade-off; do not "fix" it with async dispatch. The
/// statistics counters may be read lock-free from other threads through a
/// [`Scheduler`])
///
/// # Examples (示例)
/// ```
/// use peregrine_timer::{ManualClock, TimeWheel, WheelConfig};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = Arc::new(ManualClock::new());
/// let mut wheel = TimeWheel::new(WheelConfig::default(), clock.clone());
///
/// wheel.schedule_once(Duration::from_micros(500), || {
///     // 市场数据刷新等 (market data refresh, etc.)
/// });
///
/// clock.advance(Duration::from_millis(1));
/// let executed = wheel.tick();
/// assert_eq!(executed, 1);
/// ```
pub struct TimeWheel {
    /// Wheel levels, finest granularity first
    ///
    /// 时间轮各层，最细粒度在前
    levels: Vec<WheelLevel>,

    /// Cache: slot mask (slots_per_level - 1) for fast modulo
    ///
    /// 缓存：槽掩码（slots_per_level - 1），用于快速取模
    slot_mask: usize,

    /// Cache: slot count as u64, avoids repeated conversion
    ///
    /// 缓存：槽数量（u64），避免重复转换
    slots_u64: u64,

    /// Base tick in nanoseconds
    ///
    /// 基础 tick 纳秒数
    base_tick_ns: u64,

    /// Timestamp of the last processed tick boundary
    ///
    /// 上一次处理的 tick 边界时间戳
    last_tick_ns: u64,

    /// Base ticks processed since construction
    ///
    /// 自构造以来处理过的基础 tick 数
    total_ticks: u64,

    /// Timer index for O(1) lookup and cancellation
    ///
    /// 定时器索引，用于 O(1) 查找和取消
    timer_index: FxHashMap<TimerId, TimerLocation>,

    /// Shared state: id allocator, statistics, deferred queue
    ///
    /// 共享状态：ID 分配器、统计、延迟队列
    shared: Arc<WheelShared>,

    /// Injected time source
    ///
    /// 注入的时间源
    clock: Arc<dyn TimeSource>,
}

impl TimeWheel {
    /// Create a new timing wheel
    ///
    /// # Parameters
    /// - `config`: Wheel configuration (already validated)
    /// - `clock`: Time source constructed once at process start and injected
    ///
    /// # Notes
    /// Configuration parameters have been validated in
    /// `WheelConfig::builder().build()`, so this method will not fail.
    ///
    /// 创建新的时间轮
    ///
    /// # 参数
    /// - `config`: 时间轮配置（已验证）
    /// - `clock`: 进程启动时构造一次并注入的时间源
    ///
    /// # 注意
    /// 配置参数已在 `WheelConfig::builder().build()` 中验证，因此此方法不会失败。
    pub fn new(config: WheelConfig, clock: Arc<dyn TimeSource>) -> Self {
        let base_tick_ns = config.tick_ns();
        let slots = config.slots_per_level;

        // Each level covers slots× the range of the one below
        // 每一层覆盖下一层 slots 倍的范围
        let mut levels = Vec::with_capacity(config.levels);
        let mut tick_ns = base_tick_ns;
        for _ in 0..config.levels {
            levels.push(WheelLevel::new(slots, tick_ns, config.bucket_capacity));
            tick_ns = tick_ns.saturating_mul(slots as u64);
        }

        let last_tick_ns = clock.timestamp_ns();

        tracing::debug!(
            base_tick_ns,
            slots_per_level = slots,
            levels = config.levels,
            "time wheel initialized"
        );

        Self {
            levels,
            slot_mask: slots - 1,
            slots_u64: slots as u64,
            base_tick_ns,
            last_tick_ns,
            total_ticks: 0,
            timer_index: FxHashMap::default(),
            shared: Arc::new(WheelShared {
                next_timer_id: AtomicU64::new(1),
                stats: WheelStats::new(),
                deferred: Mutex::new(Vec::new()),
            }),
            clock,
        }
    }

    /// Create a wheel with the default configuration and the calibrated
    /// monotonic clock
    ///
    /// 使用默认配置和已校准的单调时钟创建时间轮
    pub fn with_defaults() -> Self {
        Self::new(
            WheelConfig::default(),
            Arc::new(crate::clock::MonotonicClock::new()),
        )
    }

    /// Current timestamp of the injected time source, in nanoseconds
    ///
    /// 注入时间源的当前纳秒时间戳
    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.clock.timestamp_ns()
    }

    /// Base tick duration
    ///
    /// 基础 tick 时长
    #[inline]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_nanos(self.base_tick_ns)
    }

    /// Slot count per level
    ///
    /// 每层槽数量
    #[inline]
    pub fn slots_per_level(&self) -> usize {
        self.slot_mask + 1
    }

    /// Level count
    ///
    /// 层数
    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Check whether no timer is scheduled
    ///
    /// 检查是否没有已调度的定时器
    pub fn is_empty(&self) -> bool {
        self.timer_index.is_empty() && self.shared.deferred.lock().is_empty()
    }

    /// Number of currently scheduled timers
    ///
    /// 当前已调度的定时器数量
    #[inline]
    pub fn active_timer_count(&self) -> usize {
        self.shared.stats.active_timers.load(Ordering::Relaxed)
    }

    /// Statistics snapshot (lock-free reads of the atomic counters)
    ///
    /// 统计快照（原子计数器的无锁读取）
    #[inline]
    pub fn statistics(&self) -> Statistics {
        self.shared.stats.snapshot()
    }

    /// Create a cloneable scheduling handle
    ///
    /// 创建可克隆的调度句柄
    pub fn scheduler(&self) -> Scheduler {
        Scheduler {
            shared: Arc::clone(&self.shared),
            clock: Arc::clone(&self.clock),
        }
    }

    /// Schedule a one-shot timer
    ///
    /// # Parameters
    /// - `delay`: Delay before the callback fires; sub-tick delays round up
    ///   to the next tick boundary
    /// - `callback`: Zero-argument callback, state captured by the caller
    ///
    /// # Returns
    /// Unique timer id for cancellation
    ///
    /// 调度一次性定时器
    ///
    /// # 参数
    /// - `delay`: 回调触发前的延迟；不足一个 tick 的延迟向上取整到下一个
    ///   tick 边界
    /// - `callback`: 无参数回调，所需状态由注册方捕获
    ///
    /// # 返回值
    /// 用于取消的唯一定时器 ID
    #[inline]
    pub fn schedule_once(&mut self, delay: Duration, callback: impl TimerCallback) -> TimerId {
        self.schedule(delay, TimerKind::OneShot, CallbackWrapper::new(callback))
    }

    /// Schedule a recurring timer
    ///
    /// # Parameters
    /// - `interval`: Interval between fires; also the initial delay
    /// - `callback`: Callback invoked on every expiry until cancelled
    ///
    /// 调度周期性定时器
    ///
    /// # 参数
    /// - `interval`: 两次触发之间的间隔，同时是首次触发的延迟
    /// - `callback`: 每次到期调用的回调，直到被取消
    #[inline]
    pub fn schedule_recurring(
        &mut self,
        interval: Duration,
        callback: impl TimerCallback,
    ) -> TimerId {
        let interval_ns = interval.as_nanos() as u64;
        self.schedule(
            interval,
            TimerKind::Recurring { interval_ns },
            CallbackWrapper::new(callback),
        )
    }

    fn schedule(&mut self, delay: Duration, kind: TimerKind, callback: CallbackWrapper) -> TimerId {
        let id = TimerId(self.shared.next_timer_id.fetch_add(1, Ordering::Relaxed));
        let expiry_ns = self
            .clock
            .timestamp_ns()
            .saturating_add(delay.as_nanos() as u64);

        let event = TimerEvent::new(id, expiry_ns, kind, callback);
        let reference_ns = self.last_tick_ns;
        self.insert_event(event, reference_ns);

        self.shared
            .stats
            .total_scheduled
            .fetch_add(1, Ordering::Relaxed);
        self.shared
            .stats
            .active_timers
            .fetch_add(1, Ordering::Relaxed);
        id
    }

    /// Cancel a pending timer
    ///
    /// # Parameters
    /// - `timer_id`: Id returned by one of the schedule operations
    ///
    /// # Returns
    /// `true` if the timer was still pending and is now removed, `false` for
    /// an unknown or already-fired id
    ///
    /// 取消尚未触发的定时器
    ///
    /// # 参数
    /// - `timer_id`: 调度操作返回的 ID
    ///
    /// # 返回值
    /// 如果定时器仍在等待且已被移除则返回 `true`；未知或已触发的 ID 返回
    /// `false`
    pub fn cancel_timer(&mut self, timer_id: TimerId) -> bool {
        // Materialise deferred insertions first so a freshly scheduled timer
        // is cancellable
        //
        // 先物化延迟插入，刚调度的定时器也可以被取消
        let reference_ns = self.last_tick_ns;
        self.drain_deferred(reference_ns);

        let location = match self.timer_index.remove(&timer_id) {
            Some(location) => location,
            None => return false,
        };

        let bucket = &mut self.levels[location.level as usize].buckets[location.slot_index];

        // Boundary check and id verification
        // 边界检查和 ID 验证
        if location.bucket_index >= bucket.len() || bucket[location.bucket_index].id != timer_id {
            // Index inconsistent, re-insert location to keep the map sound
            // 索引不一致，重新插入位置以保持一致性
            self.timer_index.insert(timer_id, location);
            return false;
        }

        let removed = bucket.swap_remove(location.bucket_index);
        debug_assert_eq!(removed.id, timer_id);

        // If a swap occurred, update the swapped element's index in one go
        // 如果发生了交换，一次性更新被交换元素的索引
        if location.bucket_index < bucket.len() {
            let swapped_id = bucket[location.bucket_index].id;
            if let Some(swapped_location) = self.timer_index.get_mut(&swapped_id) {
                swapped_location.bucket_index = location.bucket_index;
            }
        }

        self.shared
            .stats
            .active_timers
            .fetch_sub(1, Ordering::Relaxed);
        self.shared
            .stats
            .total_cancelled
            .fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Advance the wheel to the clock's current timestamp
    ///
    /// 将时间轮推进到时钟的当前时间戳
    #[inline]
    pub fn tick(&mut self) -> usize {
        let now_ns = self.clock.timestamp_ns();
        self.tick_at(now_ns)
    }

    /// Advance the wheel to `now_ns` and execute due timers
    ///
    /// # Parameters
    /// - `now_ns`: Current timestamp; callers may supply their own reading,
    ///   decoupling the wheel from a specific clock
    ///
    /// # Returns
    /// Number of callbacks executed by this call
    ///
    /// # Implementation Details
    /// Elapsed base ticks are simulated one at a time, so a late call
    /// catches up while preserving firing order and recurring cadence. Level
    /// L advances one slot only when level L-1 completes a full rotation;
    /// only level-0 buckets execute, higher-level buckets are re-hashed into
    /// finer levels as their slot is reached.
    ///
    /// 将时间轮推进到 `now_ns` 并执行到期定时器
    ///
    /// # 参数
    /// - `now_ns`: 当前时间戳；调用方可以自行提供读数，使时间轮与具体时钟
    ///   解耦
    ///
    /// # 返回值
    /// 本次调用执行的回调数量
    ///
    /// # 实现细节
    /// 逐个模拟经过的基础 tick，迟到的调用会在保持触发顺序和周期节奏的
    /// 前提下补齐。第 L 层只在第 L-1 层转满一圈时前进一个槽；只有第 0 层
    /// 的桶会被执行，高层桶在游标到达时被重新散列到更细的层。
    pub fn tick_at(&mut self, now_ns: u64) -> usize {
        // Materialise insertions deferred since the last boundary
        // 物化自上一个边界以来延迟的插入
        let reference_ns = self.last_tick_ns;
        self.drain_deferred(reference_ns);

        if now_ns <= self.last_tick_ns {
            return 0;
        }

        let elapsed_ns = now_ns - self.last_tick_ns;
        let ticks = elapsed_ns / self.base_tick_ns;
        if ticks == 0 {
            return 0;
        }

        let mut executed = 0;
        let mut sim_ns = self.last_tick_ns;

        for _ in 0..ticks {
            self.total_ticks += 1;
            sim_ns += self.base_tick_ns;

            let slot = (self.total_ticks & self.slot_mask as u64) as usize;
            self.levels[0].current_slot = slot;

            // A completed rotation of level 0 advances level 1, and so on
            // upward; cascade before executing so demoted due timers fire in
            // this very tick
            //
            // 第 0 层转满一圈推动第 1 层，依此向上；先级联再执行，
            // 降级下来的到期定时器在本 tick 内触发
            if slot == 0 {
                self.cascade(1, sim_ns);
            }

            executed += self.execute_bucket(slot, sim_ns);
        }

        self.last_tick_ns = now_ns;

        // Insertions deferred by callbacks during this call
        // 本次调用期间回调延迟的插入
        self.drain_deferred(now_ns);

        executed
    }

    /// Calculate wheel level and slot for an expiry timestamp
    ///
    /// # Returns
    /// `(level, slot)`; the slot is relative to the level's current cursor
    ///
    /// # Implementation Details
    /// The tick count rounds up, so a timer is never placed in a slot the
    /// cursor passes before its expiry. Delays beyond the top level's range
    /// are clamped to its farthest slot and re-cascade on every visit until
    /// the residual delay fits.
    ///
    /// 计算到期时间戳对应的层和槽
    ///
    /// # 返回值
    /// `(层, 槽)`；槽相对于该层当前游标
    ///
    /// # 实现细节
    /// tick 数向上取整，定时器不会被放进游标会在其到期前经过的槽。
    /// 超出最高层范围的延迟被钳制到最远的槽，每次被访问时重新级联，
    /// 直到剩余延迟进入范围。
    fn calculate_position(&self, expiry_ns: u64, reference_ns: u64) -> (usize, usize) {
        let delay_ns = expiry_ns.saturating_sub(reference_ns);
        let mut ticks = delay_ns
            .saturating_add(self.base_tick_ns - 1)
            / self.base_tick_ns;

        let mut level = 0;
        while level < self.levels.len() - 1 && ticks >= self.slots_u64 {
            ticks /= self.slots_u64;
            level += 1;
        }

        // Top level absorbs all larger delays
        // 最高层吸收所有更长的延迟
        if ticks >= self.slots_u64 {
            ticks = self.slots_u64 - 1;
        }

        let slot = (self.levels[level].current_slot + ticks as usize) & self.slot_mask;
        (level, slot)
    }

    /// Insert an owned event into its home bucket and record its location
    ///
    /// 将事件插入其归属桶并记录位置
    fn insert_event(&mut self, event: TimerEvent, reference_ns: u64) {
        let (level, slot) = self.calculate_position(event.expiry_ns, reference_ns);

        // A zero-tick placement would land behind the cursor and wait a full
        // rotation; push it to the next slot instead
        //
        // 零 tick 的位置落在游标后面，要等一整圈；改放到下一个槽
        let slot = if level == 0 && slot == self.levels[0].current_slot {
            (slot + 1) & self.slot_mask
        } else {
            slot
        };

        self.place(level, slot, event);
    }

    #[inline]
    fn place(&mut self, level: usize, slot: usize, event: TimerEvent) {
        let bucket_index = self.levels[level].buckets[slot].len();
        self.timer_index.insert(
            event.id,
            TimerLocation::new(level as u8, slot, bucket_index),
        );
        self.levels[level].buckets[slot].push(event);
    }

    /// Advance the cursor of a coarse level by one slot and re-hash its
    /// bucket into finer levels
    ///
    /// 将粗粒度层的游标前进一个槽，并把桶重新散列到更细的层
    fn cascade(&mut self, level: usize, now_ns: u64) {
        if level >= self.levels.len() {
            return;
        }

        let next_slot = (self.levels[level].current_slot + 1) & self.slot_mask;
        self.levels[level].current_slot = next_slot;

        // This level wrapping advances the one above before any re-hashing,
        // so demotions arrive in chronological order
        //
        // 本层回绕先推动上一层，降级按时间顺序到达
        if next_slot == 0 {
            self.cascade(level + 1, now_ns);
        }

        let mut drained: SmallVec<[TimerEvent; 8]> = SmallVec::new();
        drained.extend(self.levels[level].buckets[next_slot].drain(..));

        for event in drained {
            if event.expiry_ns <= now_ns {
                // Due now: goes straight to the level-0 slot executed in this
                // very tick
                //
                // 已到期：直接进入本 tick 将要执行的第 0 层槽
                let slot0 = self.levels[0].current_slot;
                self.place(0, slot0, event);
            } else {
                self.insert_event(event, now_ns);
            }
        }
    }

    /// Execute the due timers of one level-0 bucket
    ///
    /// # Implementation Details
    /// - Due one-shot events are destroyed after firing
    /// - Due recurring events re-arm with `expiry = fire_time + interval`
    ///   and move to their new home bucket
    /// - A panicking callback is contained at the invocation boundary,
    ///   counted as a failed execution, and processing continues
    /// - Entries that are not yet due are left untouched
    ///
    /// 执行一个第 0 层桶中的到期定时器
    ///
    /// # 实现细节
    /// - 到期的一次性事件触发后销毁
    /// - 到期的周期事件以 `expiry = 触发时间 + interval` 重新武装并移动到
    ///   新的归属桶
    /// - 回调 panic 在调用边界被拦截，计为一次失败执行，处理继续
    /// - 尚未到期的条目保持不动
    fn execute_bucket(&mut self, slot: usize, now_ns: u64) -> usize {
        let mut executed = 0;
        let mut i = 0;

        loop {
            let due = {
                let bucket = &self.levels[0].buckets[slot];
                if i >= bucket.len() {
                    break;
                }
                bucket[i].expiry_ns <= now_ns
            };

            if !due {
                i += 1;
                continue;
            }

            let mut event = self.levels[0].buckets[slot].swap_remove(i);
            self.timer_index.remove(&event.id);

            // Update the swapped element's index in one go
            // 一次性更新被交换元素的索引
            {
                let bucket = &self.levels[0].buckets[slot];
                if i < bucket.len() {
                    let swapped_id = bucket[i].id;
                    if let Some(swapped_location) = self.timer_index.get_mut(&swapped_id) {
                        swapped_location.bucket_index = i;
                    }
                }
            }

            let timer = PrecisionTimer::start(&self.clock);
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| event.callback.invoke()));
            let execution_time_ns = timer.elapsed_ns();

            match outcome {
                Ok(()) => {
                    self.shared.stats.record_execution(execution_time_ns);
                    executed += 1;
                }
                Err(_) => {
                    self.shared.stats.total_failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(timer_id = event.id.as_u64(), "timer callback panicked");
                }
            }

            match event.kind {
                TimerKind::OneShot => {
                    self.shared
                        .stats
                        .active_timers
                        .fetch_sub(1, Ordering::Relaxed);
                }
                TimerKind::Recurring { interval_ns } => {
                    // Intervals below the wheel granularity degrade to one
                    // tick
                    //
                    // 小于时间轮粒度的间隔退化为一个 tick
                    event.expiry_ns = now_ns.saturating_add(interval_ns.max(self.base_tick_ns));
                    self.insert_event(event, now_ns);
                }
            }

            // Don't increment i, swap_remove moved a new element here
            // 不增加 i，swap_remove 把新元素换到了这里
        }

        executed
    }

    /// Materialise deferred insertions from scheduler handles
    ///
    /// 物化调度句柄的延迟插入
    fn drain_deferred(&mut self, reference_ns: u64) {
        let drained = {
            let mut deferred = self.shared.deferred.lock();
            if deferred.is_empty() {
                return;
            }
            std::mem::take(&mut *deferred)
        };

        for event in drained {
            self.insert_event(event, reference_ns);
        }
    }

    #[cfg(test)]
    pub(crate) fn location_of(&self, timer_id: TimerId) -> Option<(u8, usize)> {
        self.timer_index
            .get(&timer_id)
            .map(|location| (location.level, location.slot_index))
    }
}
