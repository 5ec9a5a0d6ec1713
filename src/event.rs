//! 定时器事件类型 (Timer Event Types)
//!
//! 一个已调度回调的自包含记录，以及取消索引所需的位置信息。
//! (The self-contained record of one scheduled callback, plus the location
//! information the cancellation index needs)

/// 定时器任务唯一标识符 (Unique identifier for scheduled timers)
///
/// 由所属时间轮的原子计数器从 1 开始分配，在该时间轮的进程生命周期内唯一。
/// (Allocated from the owning wheel's atomic counter starting at 1, unique
/// for that wheel's process lifetime)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub(crate) u64);

impl TimerId {
    /// 获取标识符的数值 (Get the numeric value of the identifier)
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// 定时器回调特性 (Timer Callback Trait)
///
/// 实现此特性的类型可以作为定时器回调。回调没有参数也没有返回值，
/// 所需状态在注册时捕获。
/// (Types implementing this trait can be used as timer callbacks. Callbacks
/// take no arguments and return nothing; any state is captured at
/// registration time)
///
/// # Examples (示例)
///
/// ```
/// use peregrine_timer::TimerCallback;
///
/// struct Heartbeat;
///
/// impl TimerCallback for Heartbeat {
///     fn invoke(&mut self) {
///         // 推送心跳 (push a heartbeat)
///     }
/// }
/// ```
pub trait TimerCallback: Send + 'static {
    /// 执行回调 (Execute the callback)
    fn invoke(&mut self);
}

/// 为闭包实现 TimerCallback 特性
///
/// 支持 FnMut() 闭包，可以多次调用，适合周期性任务
///
/// 为周期任务复用同一个闭包实例，闭包内部状态得以保留。
/// (Implements TimerCallback for closures. Supports FnMut() so the same
/// closure instance is reused across recurring fires, keeping its state)
impl<F> TimerCallback for F
where
    F: FnMut() + Send + 'static,
{
    #[inline]
    fn invoke(&mut self) {
        self()
    }
}

/// 回调包装器，类型擦除后的单一调用接口
/// (Callback wrapper, the type-erased single-call interface)
///
/// # Examples (示例)
///
/// ```
/// use peregrine_timer::CallbackWrapper;
///
/// let mut fired = 0_u32;
/// let callback = CallbackWrapper::new(move || {
///     fired += 1;
/// });
/// ```
pub struct CallbackWrapper {
    callback: Box<dyn TimerCallback>,
}

impl CallbackWrapper {
    /// 创建一个新的回调包装器
    ///
    /// # 参数
    /// - `callback`: 实现 TimerCallback 特性的回调对象
    ///
    /// (Create a new callback wrapper from anything implementing
    /// TimerCallback)
    #[inline]
    pub fn new(callback: impl TimerCallback) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// 调用回调函数 (Call the callback)
    #[inline]
    pub(crate) fn invoke(&mut self) {
        self.callback.invoke()
    }
}

impl std::fmt::Debug for CallbackWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CallbackWrapper")
    }
}

/// 任务类型枚举，用于区分一次性和周期性定时器
/// (Timer kind enum distinguishing one-shot and recurring timers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// 一次性定时器：执行一次后销毁
    /// (One-shot timer: fires once and is destroyed)
    OneShot,

    /// 周期性定时器：按固定间隔重复执行，直到被取消
    /// (Recurring timer: fires at a fixed interval until cancelled)
    Recurring {
        /// 周期间隔的纳秒数 (Interval between fires in nanoseconds)
        interval_ns: u64,
    },
}

/// 定时器事件 (Timer Event)
///
/// 一个已调度回调的自包含记录。任意时刻恰好被一个桶拥有；
/// 插入、级联和重新武装时转移所有权，从不复制。
/// (The owned record of one scheduled callback. Owned by exactly one bucket
/// at any instant; ownership moves on insert, cascade and re-arm, never
/// copies)
#[derive(Debug)]
pub struct TimerEvent {
    /// 唯一标识符 (Unique identifier)
    pub(crate) id: TimerId,

    /// 到期时间戳（纳秒）(Expiry timestamp in nanoseconds)
    pub(crate) expiry_ns: u64,

    /// 任务类型（一次性或周期性）(Timer kind, one-shot or recurring)
    pub(crate) kind: TimerKind,

    /// 回调 (Callback)
    pub(crate) callback: CallbackWrapper,
}

impl TimerEvent {
    #[inline]
    pub(crate) fn new(id: TimerId, expiry_ns: u64, kind: TimerKind, callback: CallbackWrapper) -> Self {
        Self {
            id,
            expiry_ns,
            kind,
            callback,
        }
    }

    /// 周期任务的间隔，单次任务返回 `None`
    /// (Interval of a recurring timer, `None` for one-shot)
    #[inline]
    pub(crate) fn interval_ns(&self) -> Option<u64> {
        match self.kind {
            TimerKind::Recurring { interval_ns } => Some(interval_ns),
            TimerKind::OneShot => None,
        }
    }
}

/// 任务位置信息（包括层级）用于取消索引
///
/// 内存布局：level 使用 u8 放在末尾，保留多层扩展空间
///
/// (Timer location, including the level, for the cancellation index.
/// `level` is a u8 to leave room for deeper hierarchies)
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimerLocation {
    /// 槽索引 (Slot index)
    pub slot_index: usize,
    /// 桶向量中的索引位置，用于 O(1) 取消
    /// (Index in the bucket Vec, for O(1) cancellation)
    pub bucket_index: usize,
    /// 层级：0 = 最细粒度层 (Level: 0 = finest granularity)
    pub level: u8,
}

impl TimerLocation {
    /// 创建一个新的任务位置信息 (Create a new timer location)
    #[inline(always)]
    pub fn new(level: u8, slot_index: usize, bucket_index: usize) -> Self {
        Self {
            slot_index,
            bucket_index,
            level,
        }
    }
}
