use std::any::Any;

use chrono::{DateTime, Utc};
use job_context_core::JobReference;
use uuid::Uuid;

/// 内存中的作业记录
///
/// `id` 标识这一次执行记录，`active_job_id` 在重试之间保持不变。
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub id: Uuid,
    pub active_job_id: Uuid,
    pub job_class: String,
    pub queue_name: String,
    pub arguments: serde_json::Value,
    /// 之前已经执行过的次数
    pub executions: u32,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub cron_key: Option<String>,
    pub cron_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(job_class: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            active_job_id: Uuid::new_v4(),
            job_class: job_class.into(),
            queue_name: "default".to_string(),
            arguments,
            executions: 0,
            scheduled_at: None,
            cron_key: None,
            cron_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_queue(mut self, queue_name: impl Into<String>) -> Self {
        self.queue_name = queue_name.into();
        self
    }

    pub fn with_cron(mut self, cron_key: impl Into<String>, cron_at: DateTime<Utc>) -> Self {
        self.cron_key = Some(cron_key.into());
        self.cron_at = Some(cron_at);
        self.scheduled_at = Some(cron_at);
        self
    }

    /// 构造重试记录：新的执行记录 ID，同一个 ActiveJob ID
    pub fn retry_at(&self, scheduled_at: Option<DateTime<Utc>>) -> JobRecord {
        JobRecord {
            id: Uuid::new_v4(),
            executions: self.executions + 1,
            scheduled_at,
            created_at: Utc::now(),
            ..self.clone()
        }
    }

    pub fn is_cron(&self) -> bool {
        self.cron_key.is_some()
    }
}

impl JobReference for JobRecord {
    fn active_job_id(&self) -> String {
        self.active_job_id.to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
