//! # job-context-core
//!
//! 线程级作业上下文注册表。
//!
//! 本模块提供：
//! - 固定且封闭的槽位集合（[`Slot`] / [`SlotSet`]）
//! - 按 OS 线程隔离的读写接口（[`ThreadContext`]）
//! - 保证退出时恢复状态的作用域执行（[`ThreadContext::within`]）

pub mod errors;
pub mod slot;
pub mod slot_set;
pub mod thread_context;
pub mod values;

pub use errors::{ContextError, ContextResult};
pub use slot::{Slot, SlotKind, SlotValue, Timestamp};
pub use slot_set::SlotSet;
pub use thread_context::{ContextScope, ThreadContext};
pub use values::{CapturedError, JobHandle, JobReference};
