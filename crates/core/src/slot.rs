//! # 上下文槽位定义
//!
//! 槽位集合是固定且封闭的：增删槽位属于对协作方的破坏性变更。

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ContextError, ContextResult};
use crate::values::{CapturedError, JobHandle};

/// 时间戳类型
pub type Timestamp = DateTime<Utc>;

/// 可识别的槽位名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Cron 触发时间
    CronAt,
    /// Cron 调度标识
    CronKey,
    /// 作业被丢弃时捕获的错误
    ErrorOnDiscard,
    /// 作业计划重试时捕获的错误
    ErrorOnRetry,
    /// 重试次数耗尽时捕获的错误
    ErrorOnRetryStopped,
    /// 当前线程正在执行的作业
    Job,
    /// 执行是否被中断
    ExecutionInterrupted,
    /// 为重试而创建的新作业
    RetriedJob,
    /// 是否立即重试
    RetryNow,
}

impl Slot {
    /// 全部槽位，按规范顺序排列
    pub const ALL: [Slot; 9] = [
        Slot::CronAt,
        Slot::CronKey,
        Slot::ErrorOnDiscard,
        Slot::ErrorOnRetry,
        Slot::ErrorOnRetryStopped,
        Slot::Job,
        Slot::ExecutionInterrupted,
        Slot::RetriedJob,
        Slot::RetryNow,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Slot::CronAt => "cron_at",
            Slot::CronKey => "cron_key",
            Slot::ErrorOnDiscard => "error_on_discard",
            Slot::ErrorOnRetry => "error_on_retry",
            Slot::ErrorOnRetryStopped => "error_on_retry_stopped",
            Slot::Job => "job",
            Slot::ExecutionInterrupted => "execution_interrupted",
            Slot::RetriedJob => "retried_job",
            Slot::RetryNow => "retry_now",
        }
    }

    /// 槽位接受的值类型
    pub const fn kind(&self) -> SlotKind {
        match self {
            Slot::CronAt => SlotKind::Timestamp,
            Slot::CronKey => SlotKind::Text,
            Slot::ErrorOnDiscard | Slot::ErrorOnRetry | Slot::ErrorOnRetryStopped => {
                SlotKind::Error
            }
            Slot::Job | Slot::RetriedJob => SlotKind::Job,
            Slot::ExecutionInterrupted | Slot::RetryNow => SlotKind::Flag,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| ContextError::unknown_slot(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Timestamp,
    Text,
    Error,
    Job,
    Flag,
}

impl SlotKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Timestamp => "timestamp",
            SlotKind::Text => "text",
            SlotKind::Error => "error",
            SlotKind::Job => "job",
            SlotKind::Flag => "flag",
        }
    }
}

/// 槽位值的统一动态视图，供需要按名称泛化处理的协作方使用
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Timestamp(Timestamp),
    Text(String),
    Error(CapturedError),
    Job(JobHandle),
    Flag(bool),
}

impl SlotValue {
    pub const fn kind(&self) -> SlotKind {
        match self {
            SlotValue::Timestamp(_) => SlotKind::Timestamp,
            SlotValue::Text(_) => SlotKind::Text,
            SlotValue::Error(_) => SlotKind::Error,
            SlotValue::Job(_) => SlotKind::Job,
            SlotValue::Flag(_) => SlotKind::Flag,
        }
    }

    /// 日志输出用的 JSON 表示
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SlotValue::Timestamp(at) => serde_json::Value::String(at.to_rfc3339()),
            SlotValue::Text(text) => serde_json::Value::String(text.clone()),
            SlotValue::Error(error) => serde_json::Value::String(error.to_string()),
            SlotValue::Job(job) => serde_json::Value::String(job.active_job_id()),
            SlotValue::Flag(flag) => serde_json::Value::Bool(*flag),
        }
    }

    pub(crate) fn mismatch(slot: Slot, found: &SlotValue) -> ContextError {
        ContextError::TypeMismatch {
            slot,
            expected: slot.kind().as_str(),
            found: found.kind().as_str(),
        }
    }

    pub(crate) fn into_timestamp(self, slot: Slot) -> ContextResult<Timestamp> {
        match self {
            SlotValue::Timestamp(at) => Ok(at),
            other => Err(Self::mismatch(slot, &other)),
        }
    }

    pub(crate) fn into_text(self, slot: Slot) -> ContextResult<String> {
        match self {
            SlotValue::Text(text) => Ok(text),
            other => Err(Self::mismatch(slot, &other)),
        }
    }

    pub(crate) fn into_error(self, slot: Slot) -> ContextResult<CapturedError> {
        match self {
            SlotValue::Error(error) => Ok(error),
            other => Err(Self::mismatch(slot, &other)),
        }
    }

    pub(crate) fn into_job(self, slot: Slot) -> ContextResult<JobHandle> {
        match self {
            SlotValue::Job(job) => Ok(job),
            other => Err(Self::mismatch(slot, &other)),
        }
    }

    pub(crate) fn into_flag(self, slot: Slot) -> ContextResult<bool> {
        match self {
            SlotValue::Flag(flag) => Ok(flag),
            other => Err(Self::mismatch(slot, &other)),
        }
    }
}

impl From<Timestamp> for SlotValue {
    fn from(at: Timestamp) -> Self {
        SlotValue::Timestamp(at)
    }
}

impl From<String> for SlotValue {
    fn from(text: String) -> Self {
        SlotValue::Text(text)
    }
}

impl From<&str> for SlotValue {
    fn from(text: &str) -> Self {
        SlotValue::Text(text.to_string())
    }
}

impl From<CapturedError> for SlotValue {
    fn from(error: CapturedError) -> Self {
        SlotValue::Error(error)
    }
}

impl From<JobHandle> for SlotValue {
    fn from(job: JobHandle) -> Self {
        SlotValue::Job(job)
    }
}

impl From<bool> for SlotValue {
    fn from(flag: bool) -> Self {
        SlotValue::Flag(flag)
    }
}
