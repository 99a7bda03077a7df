//! Test data builders for job records

use chrono::{DateTime, Utc};
use job_context_worker::JobRecord;
use uuid::Uuid;

/// Builder for creating test JobRecord entities
pub struct JobRecordBuilder {
    job: JobRecord,
}

impl JobRecordBuilder {
    pub fn new() -> Self {
        Self {
            job: JobRecord::new("TestJob", serde_json::json!({})),
        }
    }

    pub fn with_job_class(mut self, job_class: &str) -> Self {
        self.job.job_class = job_class.to_string();
        self
    }

    pub fn with_queue(mut self, queue_name: &str) -> Self {
        self.job.queue_name = queue_name.to_string();
        self
    }

    pub fn with_arguments(mut self, arguments: serde_json::Value) -> Self {
        self.job.arguments = arguments;
        self
    }

    pub fn with_active_job_id(mut self, active_job_id: Uuid) -> Self {
        self.job.active_job_id = active_job_id;
        self
    }

    pub fn with_executions(mut self, executions: u32) -> Self {
        self.job.executions = executions;
        self
    }

    pub fn with_cron(mut self, cron_key: &str, cron_at: DateTime<Utc>) -> Self {
        self.job = self.job.with_cron(cron_key, cron_at);
        self
    }

    pub fn build(self) -> JobRecord {
        self.job
    }
}

impl Default for JobRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builder_defaults() {
        let job = JobRecordBuilder::new().build();
        assert_eq!(job.job_class, "TestJob");
        assert_eq!(job.queue_name, "default");
        assert_eq!(job.executions, 0);
        assert!(!job.is_cron());
    }

    #[test]
    fn test_builder_overrides() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let job = JobRecordBuilder::new()
            .with_job_class("ReportJob")
            .with_executions(2)
            .with_cron("nightly", at)
            .build();

        assert_eq!(job.job_class, "ReportJob");
        assert_eq!(job.executions, 2);
        assert_eq!(job.cron_at, Some(at));
    }
}
