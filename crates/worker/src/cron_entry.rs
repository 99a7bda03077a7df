use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;
use job_context_observability::{JobMetrics, JobTracer};
use tracing::debug;

use crate::errors::{WorkerError, WorkerResult};
use crate::job_record::JobRecord;

/// Cron 调度项：按表达式产生带有 `cron_key` / `cron_at` 的作业记录
#[derive(Debug, Clone)]
pub struct CronEntry {
    key: String,
    job_class: String,
    queue_name: String,
    arguments: serde_json::Value,
    schedule: Schedule,
}

impl CronEntry {
    /// 创建调度项，表达式需包含秒字段（6 或 7 段）
    pub fn new(
        key: impl Into<String>,
        job_class: impl Into<String>,
        cron_expr: &str,
    ) -> WorkerResult<Self> {
        let schedule = Schedule::from_str(cron_expr).map_err(|e| WorkerError::InvalidCron {
            expr: cron_expr.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            key: key.into(),
            job_class: job_class.into(),
            queue_name: "cron".to_string(),
            arguments: serde_json::Value::Null,
            schedule,
        })
    }

    pub fn with_arguments(mut self, arguments: serde_json::Value) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn job_class(&self) -> &str {
        &self.job_class
    }

    /// 获取下一次执行时间
    pub fn next_at(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }

    /// 获取从指定时间开始的多个执行时间
    pub fn upcoming(&self, after: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        self.schedule.after(&after).take(count).collect()
    }

    /// 为指定触发时间构造作业记录
    pub fn build_job(&self, cron_at: DateTime<Utc>) -> JobRecord {
        let _span = JobTracer::cron_enqueue_span(&self.key, &self.job_class).entered();
        debug!(
            cron.key = self.key.as_str(),
            cron.at = %cron_at,
            "Building cron job"
        );
        JobMetrics::record_cron_enqueued(&self.key);

        JobRecord::new(self.job_class.clone(), self.arguments.clone())
            .with_queue(self.queue_name.clone())
            .with_cron(self.key.clone(), cron_at)
    }

    /// 构造下一次触发对应的作业记录
    pub fn next_job(&self, after: DateTime<Utc>) -> Option<JobRecord> {
        self.next_at(after).map(|at| self.build_job(at))
    }
}
