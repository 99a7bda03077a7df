use crate::context_fields::ContextFields;

pub struct JobTracer;

impl JobTracer {
    pub fn execute_job_span(fields: &ContextFields, job_class: &str) -> tracing::Span {
        tracing::info_span!(
            "execute_job",
            job.class = job_class,
            job.active_job_id = fields.active_job_id.as_deref(),
            thread.name = fields.thread_name.as_str(),
            process.id = fields.process_id,
            cron.key = fields.cron_key.as_deref(),
        )
    }

    pub fn cron_enqueue_span(cron_key: &str, job_class: &str) -> tracing::Span {
        tracing::debug_span!("enqueue_cron_job", cron.key = cron_key, job.class = job_class)
    }
}
