use tracing::{debug, error, info, warn};

use crate::context_fields::ContextFields;

pub struct StructuredLogger;

impl StructuredLogger {
    pub fn log_job_started(fields: &ContextFields, job_class: &str) {
        let cron_at = fields.cron_at_rfc3339();
        info!(
            event = "job_started",
            process.id = fields.process_id,
            thread.name = fields.thread_name.as_str(),
            host.name = fields.hostname.as_str(),
            job.class = job_class,
            job.active_job_id = fields.active_job_id.as_deref(),
            cron.key = fields.cron_key.as_deref(),
            cron.at = cron_at.as_deref(),
            "Job execution started"
        );
    }

    pub fn log_job_succeeded(fields: &ContextFields, job_class: &str, duration_ms: u64) {
        info!(
            event = "job_succeeded",
            process.id = fields.process_id,
            thread.name = fields.thread_name.as_str(),
            job.class = job_class,
            job.active_job_id = fields.active_job_id.as_deref(),
            job.duration_ms = duration_ms,
            "Job execution completed successfully"
        );
    }

    pub fn log_job_retried(fields: &ContextFields, job_class: &str, duration_ms: u64) {
        let error = fields.captured_error_message();
        let retried = fields.retried_active_job_id();
        warn!(
            event = "job_retried",
            process.id = fields.process_id,
            thread.name = fields.thread_name.as_str(),
            job.class = job_class,
            job.active_job_id = fields.active_job_id.as_deref(),
            job.duration_ms = duration_ms,
            job.retry_now = fields.slots.retry_now.unwrap_or(false),
            retried_job.active_job_id = retried.as_deref(),
            error = error.as_deref(),
            "Job scheduled for retry"
        );
    }

    pub fn log_retry_stopped(fields: &ContextFields, job_class: &str, duration_ms: u64) {
        let error = fields.captured_error_message();
        error!(
            event = "job_retry_stopped",
            process.id = fields.process_id,
            thread.name = fields.thread_name.as_str(),
            job.class = job_class,
            job.active_job_id = fields.active_job_id.as_deref(),
            job.duration_ms = duration_ms,
            error = error.as_deref(),
            context = %fields.slots_json(),
            "Job retries exhausted"
        );
    }

    pub fn log_job_discarded(fields: &ContextFields, job_class: &str, duration_ms: u64) {
        let error = fields.captured_error_message();
        error!(
            event = "job_discarded",
            process.id = fields.process_id,
            thread.name = fields.thread_name.as_str(),
            job.class = job_class,
            job.active_job_id = fields.active_job_id.as_deref(),
            job.duration_ms = duration_ms,
            error = error.as_deref(),
            context = %fields.slots_json(),
            "Job discarded"
        );
    }

    pub fn log_job_interrupted(fields: &ContextFields, job_class: &str) {
        let retried = fields.retried_active_job_id();
        warn!(
            event = "job_interrupted",
            process.id = fields.process_id,
            thread.name = fields.thread_name.as_str(),
            job.class = job_class,
            job.active_job_id = fields.active_job_id.as_deref(),
            retried_job.active_job_id = retried.as_deref(),
            "Job execution interrupted"
        );
    }

    pub fn log_context_snapshot(fields: &ContextFields) {
        debug!(
            event = "context_snapshot",
            process.id = fields.process_id,
            thread.name = fields.thread_name.as_str(),
            context = %fields.slots_json(),
            "Thread context snapshot"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use job_context_core::{CapturedError, ThreadContext};
    use tracing_subscriber::fmt;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        buffer.contents()
    }

    #[test]
    fn test_retry_event_carries_context_fields() {
        let ctx = ThreadContext::current();
        let output = ctx.within(|ctx| {
            ctx.reset();
            ctx.set_cron_key(Some("hourly_sync".into()));
            ctx.set_error_on_retry(Some(CapturedError::message("upstream timeout")));
            ctx.set_retry_now(Some(true));
            let fields = ContextFields::capture(ctx);
            capture_logs(|| StructuredLogger::log_job_retried(&fields, "SyncJob", 12))
        });

        assert!(output.contains("\"event\":\"job_retried\""));
        assert!(output.contains("\"job.class\":\"SyncJob\""));
        assert!(output.contains("\"error\":\"upstream timeout\""));
        assert!(output.contains("\"job.retry_now\":true"));
        assert!(output.contains(&format!("\"process.id\":{}", std::process::id())));
    }

    #[test]
    fn test_discard_event_includes_slot_snapshot() {
        let ctx = ThreadContext::current();
        let output = ctx.within(|ctx| {
            ctx.reset();
            ctx.set_error_on_discard(Some(CapturedError::message("bad payload")));
            let fields = ContextFields::capture(ctx);
            capture_logs(|| StructuredLogger::log_job_discarded(&fields, "ImportJob", 3))
        });

        assert!(output.contains("\"event\":\"job_discarded\""));
        assert!(output.contains("bad payload"));
        assert!(output.contains("error_on_discard"));
    }
}
