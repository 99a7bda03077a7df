//! # 槽位集合
//!
//! 每个线程持有一份固定形状的记录，同时它也是快照类型。

use std::collections::{BTreeMap, HashMap};

use crate::errors::{ContextError, ContextResult};
use crate::slot::{Slot, SlotValue, Timestamp};
use crate::values::{CapturedError, JobHandle};

/// 一个线程的全部槽位
///
/// 这是一个拥有所有权的值：从注册表导出的快照不会被之后的写入影响。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotSet {
    pub cron_at: Option<Timestamp>,
    pub cron_key: Option<String>,
    pub error_on_discard: Option<CapturedError>,
    pub error_on_retry: Option<CapturedError>,
    pub error_on_retry_stopped: Option<CapturedError>,
    pub job: Option<JobHandle>,
    pub execution_interrupted: Option<bool>,
    pub retried_job: Option<JobHandle>,
    pub retry_now: Option<bool>,
}

impl SlotSet {
    /// 所有槽位均未设置
    pub const EMPTY: SlotSet = SlotSet {
        cron_at: None,
        cron_key: None,
        error_on_discard: None,
        error_on_retry: None,
        error_on_retry_stopped: None,
        job: None,
        execution_interrupted: None,
        retried_job: None,
        retry_now: None,
    };

    pub fn new() -> Self {
        Self::EMPTY
    }

    pub fn is_empty(&self) -> bool {
        Slot::ALL.iter().all(|slot| !self.is_set(*slot))
    }

    pub fn is_set(&self, slot: Slot) -> bool {
        match slot {
            Slot::CronAt => self.cron_at.is_some(),
            Slot::CronKey => self.cron_key.is_some(),
            Slot::ErrorOnDiscard => self.error_on_discard.is_some(),
            Slot::ErrorOnRetry => self.error_on_retry.is_some(),
            Slot::ErrorOnRetryStopped => self.error_on_retry_stopped.is_some(),
            Slot::Job => self.job.is_some(),
            Slot::ExecutionInterrupted => self.execution_interrupted.is_some(),
            Slot::RetriedJob => self.retried_job.is_some(),
            Slot::RetryNow => self.retry_now.is_some(),
        }
    }

    pub fn get(&self, slot: Slot) -> Option<SlotValue> {
        match slot {
            Slot::CronAt => self.cron_at.map(SlotValue::Timestamp),
            Slot::CronKey => self.cron_key.clone().map(SlotValue::Text),
            Slot::ErrorOnDiscard => self.error_on_discard.clone().map(SlotValue::Error),
            Slot::ErrorOnRetry => self.error_on_retry.clone().map(SlotValue::Error),
            Slot::ErrorOnRetryStopped => self.error_on_retry_stopped.clone().map(SlotValue::Error),
            Slot::Job => self.job.clone().map(SlotValue::Job),
            Slot::ExecutionInterrupted => self.execution_interrupted.map(SlotValue::Flag),
            Slot::RetriedJob => self.retried_job.clone().map(SlotValue::Job),
            Slot::RetryNow => self.retry_now.map(SlotValue::Flag),
        }
    }

    /// 写入单个槽位，返回被替换掉的旧值
    ///
    /// 类型不匹配时不会修改任何内容。
    pub fn set(&mut self, slot: Slot, value: Option<SlotValue>) -> ContextResult<Option<SlotValue>> {
        let previous = self.get(slot);
        match slot {
            Slot::CronAt => {
                self.cron_at = value.map(|v| v.into_timestamp(slot)).transpose()?;
            }
            Slot::CronKey => {
                self.cron_key = value.map(|v| v.into_text(slot)).transpose()?;
            }
            Slot::ErrorOnDiscard => {
                self.error_on_discard = value.map(|v| v.into_error(slot)).transpose()?;
            }
            Slot::ErrorOnRetry => {
                self.error_on_retry = value.map(|v| v.into_error(slot)).transpose()?;
            }
            Slot::ErrorOnRetryStopped => {
                self.error_on_retry_stopped = value.map(|v| v.into_error(slot)).transpose()?;
            }
            Slot::Job => {
                self.job = value.map(|v| v.into_job(slot)).transpose()?;
            }
            Slot::ExecutionInterrupted => {
                self.execution_interrupted = value.map(|v| v.into_flag(slot)).transpose()?;
            }
            Slot::RetriedJob => {
                self.retried_job = value.map(|v| v.into_job(slot)).transpose()?;
            }
            Slot::RetryNow => {
                self.retry_now = value.map(|v| v.into_flag(slot)).transpose()?;
            }
        }
        Ok(previous)
    }

    /// 按规范顺序遍历全部槽位（包括未设置的）
    pub fn iter(&self) -> impl Iterator<Item = (Slot, Option<SlotValue>)> + '_ {
        Slot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }

    /// 导出为通用映射，键恰好是全部九个槽位
    pub fn to_map(&self) -> BTreeMap<Slot, Option<SlotValue>> {
        self.iter().collect()
    }

    /// 由覆盖值构造：未出现的槽位保持未设置
    pub fn from_map<I>(overrides: I) -> ContextResult<Self>
    where
        I: IntoIterator<Item = (Slot, Option<SlotValue>)>,
    {
        let mut slots = SlotSet::EMPTY;
        for (slot, value) in overrides {
            slots.set(slot, value)?;
        }
        Ok(slots)
    }

    /// 与 `from_map` 相同，但键为槽位名称字符串
    pub fn from_named(overrides: HashMap<String, Option<SlotValue>>) -> ContextResult<Self> {
        let pairs = overrides
            .into_iter()
            .map(|(name, value)| Ok((name.parse::<Slot>()?, value)))
            .collect::<Result<Vec<_>, ContextError>>()?;
        Self::from_map(pairs)
    }

    /// 日志输出用的 JSON 对象，未设置的槽位为 null
    pub fn to_json(&self) -> serde_json::Value {
        let object = self
            .iter()
            .map(|(slot, value)| {
                let json = value.map_or(serde_json::Value::Null, |v| v.to_json());
                (slot.as_str().to_string(), json)
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(object)
    }
}
