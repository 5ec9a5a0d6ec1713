//! 时间轮配置模块 (Timing Wheel Configuration Module)
//!
//! 提供配置结构和 Builder 模式，用于配置时间轮的几何结构与桶容量。
//! (Provides configuration structure and Builder pattern for configuring
//! wheel geometry and bucket capacity)

use crate::error::TimerError;
use std::time::Duration;

/// 时间轮配置 (Timing Wheel Configuration)
///
/// 所有层共享同一个槽位数量；第 L 层的 tick 时长是基础 tick 的
/// `slots_per_level^L` 倍。
/// (All levels share one slot count; the tick of level L is the base tick
/// times `slots_per_level^L`)
///
/// # 示例 (Examples)
/// ```no_run
/// use peregrine_timer::WheelConfig;
/// use std::time::Duration;
///
/// // 使用默认配置（1µs 基础 tick，256 槽，4 层）
/// //    (Use default configuration: 1µs base tick, 256 slots, 4 levels)
/// let config = WheelConfig::default();
///
/// // 使用 Builder 自定义配置
/// //    (Use Builder to customize configuration)
/// let config = WheelConfig::builder()
///     .tick_duration(Duration::from_micros(10))
///     .slots_per_level(512)
///     .levels(3)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct WheelConfig {
    /// 最底层每个 tick 的时间长度
    /// (Duration of one base tick, the bottom level granularity)
    pub tick_duration: Duration,
    /// 每层槽位数量（必须是 2 的幂次方）
    /// (Number of slots per level, must be power of 2)
    pub slots_per_level: usize,
    /// 层数 (Number of levels)
    pub levels: usize,
    /// 每个桶预分配的容量，热路径上避免分配
    /// (Pre-reserved capacity of each bucket, keeps the hot path allocation-free)
    pub bucket_capacity: usize,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            tick_duration: Duration::from_micros(1),
            slots_per_level: 256,
            levels: 4,
            bucket_capacity: 16,
        }
    }
}

impl WheelConfig {
    /// 创建配置构建器 (Create configuration builder)
    pub fn builder() -> WheelConfigBuilder {
        WheelConfigBuilder::default()
    }

    /// 基础 tick 的纳秒数 (Base tick in nanoseconds)
    #[inline]
    pub(crate) fn tick_ns(&self) -> u64 {
        self.tick_duration.as_nanos() as u64
    }
}

/// 时间轮配置构建器 (Timing Wheel Configuration Builder)
#[derive(Debug, Clone)]
pub struct WheelConfigBuilder {
    tick_duration: Duration,
    slots_per_level: usize,
    levels: usize,
    bucket_capacity: usize,
}

impl Default for WheelConfigBuilder {
    fn default() -> Self {
        let config = WheelConfig::default();
        Self {
            tick_duration: config.tick_duration,
            slots_per_level: config.slots_per_level,
            levels: config.levels,
            bucket_capacity: config.bucket_capacity,
        }
    }
}

impl WheelConfigBuilder {
    /// 设置基础 tick 时长 (Set base tick duration)
    pub fn tick_duration(mut self, duration: Duration) -> Self {
        self.tick_duration = duration;
        self
    }

    /// 设置每层槽位数量 (Set slot count per level)
    pub fn slots_per_level(mut self, count: usize) -> Self {
        self.slots_per_level = count;
        self
    }

    /// 设置层数 (Set level count)
    pub fn levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }

    /// 设置桶预分配容量 (Set bucket pre-reserved capacity)
    pub fn bucket_capacity(mut self, capacity: usize) -> Self {
        self.bucket_capacity = capacity;
        self
    }

    /// 构建配置并进行验证
    ///      (Build and validate configuration)
    ///
    /// # 返回 (Returns)
    /// - `Ok(WheelConfig)`: 配置有效
    ///      (Configuration is valid)
    /// - `Err(TimerError)`: 配置验证失败
    ///      (Configuration validation failed)
    ///
    /// # 验证规则 (Validation Rules)
    /// - 基础 tick 时长必须大于 0
    ///      (Base tick duration must be greater than 0)
    /// - 槽位数量必须大于 1 且是 2 的幂次方
    ///      (Slot count must be greater than 1 and a power of 2)
    /// - 层数必须在 1 到 8 之间
    ///      (Level count must be between 1 and 8)
    /// - 最高层的 tick 时长不能溢出 u64 纳秒
    ///      (The top level tick must not overflow u64 nanoseconds)
    pub fn build(self) -> Result<WheelConfig, TimerError> {
        if self.tick_duration.is_zero() {
            return Err(TimerError::InvalidConfiguration {
                field: "tick_duration".to_string(),
                reason: "基础 tick 时长必须大于 0".to_string(),
            });
        }

        if self.tick_duration.as_nanos() > u128::from(u64::MAX) {
            return Err(TimerError::InvalidConfiguration {
                field: "tick_duration".to_string(),
                reason: "基础 tick 时长超出 u64 纳秒范围".to_string(),
            });
        }

        if self.slots_per_level < 2 {
            return Err(TimerError::InvalidSlotCount {
                slot_count: self.slots_per_level,
                reason: "槽位数量必须大于 1",
            });
        }

        if !self.slots_per_level.is_power_of_two() {
            return Err(TimerError::InvalidSlotCount {
                slot_count: self.slots_per_level,
                reason: "槽位数量必须是 2 的幂次方",
            });
        }

        if self.levels == 0 || self.levels > 8 {
            return Err(TimerError::InvalidLevelCount {
                levels: self.levels,
                reason: "层数必须在 1 到 8 之间",
            });
        }

        // 验证最高层 tick 不溢出：tick_ns * slots^(levels-1)
        // (Validate the top level tick does not overflow)
        let tick_ns = self.tick_duration.as_nanos() as u64;
        let mut top_tick_ns = tick_ns;
        for _ in 1..self.levels {
            top_tick_ns = match top_tick_ns.checked_mul(self.slots_per_level as u64) {
                Some(v) => v,
                None => {
                    return Err(TimerError::InvalidConfiguration {
                        field: "levels".to_string(),
                        reason: format!(
                            "tick 时长 {} ns 乘以 {} 层槽位后溢出 u64",
                            tick_ns, self.levels
                        ),
                    });
                }
            };
        }

        Ok(WheelConfig {
            tick_duration: self.tick_duration,
            slots_per_level: self.slots_per_level,
            levels: self.levels,
            bucket_capacity: self.bucket_capacity,
        })
    }
}
