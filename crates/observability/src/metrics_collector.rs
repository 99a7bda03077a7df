use std::time::Duration;

use job_context_core::Slot;
use metrics::{counter, histogram};

pub struct JobMetrics;

impl JobMetrics {
    pub fn record_outcome(job_class: &str, outcome: &'static str, duration: Duration) {
        counter!(
            "job_context_jobs_total",
            "job_class" => job_class.to_string(),
            "outcome" => outcome
        )
        .increment(1);
        histogram!(
            "job_context_job_duration_seconds",
            "job_class" => job_class.to_string()
        )
        .record(duration.as_secs_f64());
    }

    pub fn record_captured_error(job_class: &str, slot: Slot) {
        counter!(
            "job_context_captured_errors_total",
            "job_class" => job_class.to_string(),
            "slot" => slot.as_str()
        )
        .increment(1);
    }

    pub fn record_cron_enqueued(cron_key: &str) {
        counter!("job_context_cron_enqueued_total", "cron_key" => cron_key.to_string()).increment(1);
    }
}
