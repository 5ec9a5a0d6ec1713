//! # 高精度分层时间轮 (High-Precision Hierarchical Timing Wheel)
//!
//! 为高频交易 / 链上 MEV 后端设计的定时器调度核心：以亚微秒粒度触发回调，
//! 驱动行情与 gas 数据的周期刷新、缓存过期、订单超时和监控心跳。
//! (The timer-scheduling core of a high-frequency trading / on-chain MEV
//! backend: fires callbacks at sub-microsecond granularity, driving periodic
//! market/gas refresh, cache expiry, order timeouts and monitoring
//! heartbeats)
//!
//! ## 特性 (Features)
//!
//! - **O(1) 调度 (O(1) Scheduling)**: 插入和取消的均摊时间复杂度为 O(1)，
//!   取消通过 `TimerId -> 位置` 索引直达
//!   (Amortized O(1) insertion and cancellation; cancel goes straight
//!   through a `TimerId -> location` index)
//! - **分层级联 (Hierarchical Cascading)**: 默认 4 层 × 256 槽，短延迟落入
//!   细粒度层，长延迟随到期临近逐层降级
//!   (Default 4 levels × 256 slots; short delays land in fine levels, long
//!   delays demote level by level as expiry approaches)
//! - **内联执行 (Inline Execution)**: 回调在 `tick` 内部、调用线程上同步
//!   执行，没有分发开销
//!   (Callbacks run synchronously on the calling thread inside `tick`, no
//!   dispatch overhead)
//! - **无锁统计 (Lock-Free Statistics)**: 监控线程通过原子计数器读取
//!   调度、执行、取消和执行耗时指标，无需协调
//!   (Monitoring threads read scheduling/execution/cancel/latency counters
//!   through atomics, no coordination needed)
//!
//! ## 快速开始 (Quick Start)
//!
//! ```
//! use peregrine_timer::{ManualClock, TimeWheel, WheelConfig};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//!
//! // 时钟在进程启动时构造一次并注入
//! //    (The clock is constructed once at process start and injected)
//! let clock = Arc::new(ManualClock::new());
//! let mut wheel = TimeWheel::new(WheelConfig::default(), clock.clone());
//!
//! let fired = Arc::new(AtomicU32::new(0));
//! let fired_clone = Arc::clone(&fired);
//! wheel.schedule_once(Duration::from_micros(500), move || {
//!     fired_clone.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! // 驱动方周期性地推进时间轮 (The driver advances the wheel periodically)
//! clock.advance(Duration::from_millis(1));
//! assert_eq!(wheel.tick(), 1);
//! assert_eq!(fired.load(Ordering::SeqCst), 1);
//! ```
//!
//! ## 架构说明 (Architecture)
//!
//! ### 时间轮算法 (Timing Wheel Algorithm)
//!
//! 采用分层时间轮算法，默认 4 层，每层 256 个槽：
//!
//! - **第 0 层**: tick = 基础 tick（默认 1µs），覆盖 256µs
//! - **第 1 层**: tick = 基础 tick × 256，覆盖 65.5ms
//! - **第 2 层**: tick = 基础 tick × 256²，覆盖 16.8s
//! - **第 3 层**: tick = 基础 tick × 256³，吸收所有更长的延迟
//!
//! 第 L 层的游标只在第 L-1 层转满一圈时前进一个槽；只有第 0 层的桶会被
//! 执行，高层桶在游标到达时整体重新散列到更细的层（级联）。
//!
//! (Hierarchical wheel, default 4 levels of 256 slots each. Level 0 ticks at
//! the base tick, default 1µs, covering 256µs; each level above covers 256×
//! the range below; the top level absorbs everything longer. The cursor of
//! level L advances one slot only when level L-1 completes a full rotation;
//! only level-0 buckets execute, higher-level buckets are re-hashed wholesale
//! into finer levels as the cursor reaches them, i.e. cascading)
//!
//! ### 并发模型 (Concurrency Model)
//!
//! 单写者：`schedule_*` / `cancel_timer` / `tick` 都要求 `&mut self`，
//! 由一个驱动线程独占。回调内部通过 [`Scheduler`] 句柄重入调度，插入被
//! 推迟到当前桶扫描之后。统计计数器随时可以从其他线程无锁读取。
//!
//! (Single writer: all mutating operations take `&mut self` and belong to
//! one driver thread. Callbacks schedule re-entrantly through a
//! [`Scheduler`] handle, with insertion deferred past the current bucket
//! scan. The statistics counters are readable lock-free from any thread)
//!
//! ### 性能优化 (Performance Optimization)
//!
//! - 槽位数量为 2 的幂次方，使用位运算代替取模
//!   (Power-of-two slot counts, bit masking instead of modulo)
//! - 使用 `FxHashMap`（rustc-hash）维护取消索引，减少哈希开销
//!   (Cancellation index in `FxHashMap` from rustc-hash, cheaper hashing)
//! - 桶预分配容量，常规调度路径零分配
//!   (Pre-reserved bucket capacity, allocation-free common path)
//! - 时间戳来自 `quanta` 的一次性校准 TSC/timebase 时钟
//!   (Timestamps from quanta's once-calibrated TSC/timebase clock)

mod clock;
mod config;
mod driver;
mod error;
mod event;
mod stats;
mod wheel;

#[cfg(test)]
mod tests;

// 重新导出公共 API (Re-export public API)
pub use clock::{ManualClock, MonotonicClock, PrecisionTimer, TimeSource};
pub use config::{WheelConfig, WheelConfigBuilder};
pub use driver::TimerDriver;
pub use error::TimerError;
pub use event::{CallbackWrapper, TimerCallback, TimerId};
pub use stats::Statistics;
pub use wheel::{Scheduler, TimeWheel};
