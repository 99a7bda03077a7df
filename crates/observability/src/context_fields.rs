use std::sync::OnceLock;

use job_context_core::{CapturedError, SlotSet, ThreadContext, Timestamp};

static HOSTNAME: OnceLock<String> = OnceLock::new();

fn hostname() -> &'static str {
    HOSTNAME.get_or_init(|| {
        hostname::get()
            .unwrap_or_else(|_| "unknown".into())
            .to_string_lossy()
            .to_string()
    })
}

/// 日志关联字段：从当前线程上下文采集的一次性快照
#[derive(Debug, Clone, PartialEq)]
pub struct ContextFields {
    pub process_id: u32,
    pub thread_name: String,
    pub hostname: String,
    pub active_job_id: Option<String>,
    pub cron_key: Option<String>,
    pub cron_at: Option<Timestamp>,
    pub slots: SlotSet,
}

impl ContextFields {
    pub fn capture(ctx: &ThreadContext) -> Self {
        let slots = ctx.export_all();
        Self {
            process_id: ctx.process_id(),
            thread_name: ctx.thread_name(),
            hostname: hostname().to_string(),
            active_job_id: slots.job.as_ref().map(|job| job.active_job_id()),
            cron_key: slots.cron_key.clone(),
            cron_at: slots.cron_at,
            slots,
        }
    }

    pub fn cron_at_rfc3339(&self) -> Option<String> {
        self.cron_at.map(|at| at.to_rfc3339())
    }

    pub fn retried_active_job_id(&self) -> Option<String> {
        self.slots.retried_job.as_ref().map(|job| job.active_job_id())
    }

    /// 首个被捕获的错误（丢弃 > 重试耗尽 > 重试）
    pub fn captured_error(&self) -> Option<&CapturedError> {
        self.slots
            .error_on_discard
            .as_ref()
            .or(self.slots.error_on_retry_stopped.as_ref())
            .or(self.slots.error_on_retry.as_ref())
    }

    pub fn captured_error_message(&self) -> Option<String> {
        self.captured_error().map(ToString::to_string)
    }

    pub fn slots_json(&self) -> serde_json::Value {
        self.slots.to_json()
    }
}
