//! # 线程级上下文注册表
//!
//! 每个 OS 线程持有一份独立的 [`SlotSet`]，首次访问时惰性初始化为全空。
//! 线程之间不共享任何槽位状态，因此读写都不需要加锁。
//!
//! 注意：注册表按 OS 线程划分。异步任务可能在 await 点之间迁移线程，
//! 需要使用上下文的作业体应当运行在专用的阻塞线程上。

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::ContextResult;
use crate::slot::{Slot, SlotValue, Timestamp};
use crate::slot_set::SlotSet;
use crate::values::{CapturedError, JobHandle};

thread_local! {
    static CURRENT: RefCell<SlotSet> = const { RefCell::new(SlotSet::EMPTY) };
    static THREAD_SEQ: Cell<Option<u64>> = const { Cell::new(None) };
}

static NEXT_THREAD_SEQ: AtomicU64 = AtomicU64::new(1);

// 闭包内不得调用用户代码：借用期间再次访问注册表会 panic。
fn read<R>(f: impl FnOnce(&SlotSet) -> R) -> R {
    CURRENT.with(|cell| f(&cell.borrow()))
}

fn write<R>(f: impl FnOnce(&mut SlotSet) -> R) -> R {
    CURRENT.with(|cell| f(&mut cell.borrow_mut()))
}

fn replace_all(slots: SlotSet) -> SlotSet {
    CURRENT.with(|cell| cell.replace(slots))
}

fn thread_sequence() -> u64 {
    THREAD_SEQ.with(|seq| match seq.get() {
        Some(n) => n,
        None => {
            let n = NEXT_THREAD_SEQ.fetch_add(1, Ordering::Relaxed);
            seq.set(Some(n));
            n
        }
    })
}

/// 当前线程上下文的句柄
///
/// 句柄不占空间且不能跨线程传递（`!Send`），所有操作只作用于调用线程。
#[derive(Debug, Clone, Copy)]
pub struct ThreadContext {
    _not_send: PhantomData<*const ()>,
}

macro_rules! slot_accessors {
    ($( $(#[$doc:meta])* $field:ident / $setter:ident : $ty:ty; )*) => {
        impl ThreadContext {
            $(
                $(#[$doc])*
                pub fn $field(&self) -> Option<$ty> {
                    read(|slots| slots.$field.clone())
                }

                pub fn $setter(&self, value: Option<$ty>) {
                    // 旧值在借用释放后才析构
                    let previous = write(|slots| std::mem::replace(&mut slots.$field, value));
                    drop(previous);
                }
            )*
        }
    };
}

slot_accessors! {
    /// Cron 触发时间
    cron_at / set_cron_at: Timestamp;
    /// Cron 调度标识
    cron_key / set_cron_key: String;
    /// 丢弃作业时捕获的错误
    error_on_discard / set_error_on_discard: CapturedError;
    /// 计划重试时捕获的错误
    error_on_retry / set_error_on_retry: CapturedError;
    /// 重试耗尽时捕获的错误
    error_on_retry_stopped / set_error_on_retry_stopped: CapturedError;
    /// 当前正在执行的作业
    job / set_job: JobHandle;
    /// 执行是否被中断
    execution_interrupted / set_execution_interrupted: bool;
    /// 重试产生的新作业
    retried_job / set_retried_job: JobHandle;
    /// 是否立即重试
    retry_now / set_retry_now: bool;
}

impl ThreadContext {
    /// 获取调用线程的上下文句柄
    pub fn current() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }

    /// 按名称读取槽位
    pub fn get(&self, slot: Slot) -> Option<SlotValue> {
        read(|slots| slots.get(slot))
    }

    /// 按名称写入槽位，`None` 表示清空
    ///
    /// 只有值类型与槽位不匹配时才会失败，失败时状态保持不变。
    pub fn set(&self, slot: Slot, value: Option<SlotValue>) -> ContextResult<()> {
        if let Some(value) = &value {
            if value.kind() != slot.kind() {
                return Err(SlotValue::mismatch(slot, value));
            }
        }
        let previous = write(|slots| slots.set(slot, value))?;
        drop(previous);
        Ok(())
    }

    /// 清空全部槽位
    pub fn reset(&self) {
        self.reset_with(SlotSet::EMPTY);
    }

    /// 用给定记录整体替换当前线程的槽位
    ///
    /// 语义是"先全部清空再应用覆盖值"，而不是合并：
    /// `overrides` 中未设置的槽位在调用后一律为空。
    pub fn reset_with(&self, overrides: SlotSet) {
        let previous = replace_all(overrides);
        drop(previous);
    }

    /// 与 [`reset_with`](Self::reset_with) 相同，覆盖值以 (槽位, 值) 对给出
    ///
    /// 任一值类型不匹配时返回错误，且不修改当前状态。
    pub fn reset_from<I>(&self, overrides: I) -> ContextResult<()>
    where
        I: IntoIterator<Item = (Slot, Option<SlotValue>)>,
    {
        let slots = SlotSet::from_map(overrides)?;
        self.reset_with(slots);
        Ok(())
    }

    /// 导出当前线程全部槽位的快照
    pub fn export_all(&self) -> SlotSet {
        read(SlotSet::clone)
    }

    /// 当前作业的 ActiveJob ID，未设置作业时返回 `None`
    pub fn active_job_id(&self) -> Option<String> {
        self.job().map(|job| job.active_job_id())
    }

    /// 当前进程 ID
    pub fn process_id(&self) -> u32 {
        std::process::id()
    }

    /// 当前线程的可读名称
    ///
    /// 线程有名称时返回名称，否则返回进程内唯一的 `#<n>`。
    /// 生成的名称不会与 `thread-1`、`worker-1` 这类常规线程名重叠。
    pub fn thread_name(&self) -> String {
        let thread = std::thread::current();
        match thread.name() {
            Some(name) => name.to_string(),
            None => format!("#{}", thread_sequence()),
        }
    }

    /// 进入一个上下文作用域，作用域对象被丢弃时恢复进入时的状态
    ///
    /// 多个守卫必须按创建顺序的逆序丢弃（后进先出）。先丢弃外层守卫时，
    /// 内层守卫会在之后把外层作用域内的修改重新写回。需要保证栈式恢复时
    /// 使用 [`within`](Self::within)。
    pub fn scope(&self) -> ContextScope {
        ContextScope {
            saved: self.export_all(),
            _not_send: PhantomData,
        }
    }

    /// 在上下文作用域内执行 `body`
    ///
    /// `body` 可以自由读写当前线程的槽位。无论 `body` 正常返回、返回 `Err`
    /// 还是 panic，退出时都会先恢复进入前的状态，再把结果（或 panic）交给调用方。
    pub fn within<F, R>(&self, body: F) -> R
    where
        F: FnOnce(&ThreadContext) -> R,
    {
        let _scope = self.scope();
        body(self)
    }
}

/// 上下文作用域守卫
///
/// 创建时保存快照，析构时无条件恢复。守卫同样是 `!Send`，
/// 保证恢复发生在保存快照的那个线程上。
#[must_use = "上下文在守卫被丢弃时立即恢复"]
#[derive(Debug)]
pub struct ContextScope {
    saved: SlotSet,
    _not_send: PhantomData<*const ()>,
}

impl ContextScope {
    /// 进入作用域时保存的快照
    pub fn saved(&self) -> &SlotSet {
        &self.saved
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        let saved = std::mem::take(&mut self.saved);
        // 线程本地存储已销毁时没有可恢复的状态
        let previous = CURRENT.try_with(|cell| cell.replace(saved));
        drop(previous);
    }
}
