use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use job_context_config::{ConfigValidator, WorkerConfig};
use job_context_core::{CapturedError, JobHandle, Slot, SlotSet, ThreadContext};
use job_context_observability::{ContextFields, JobMetrics, JobTracer, StructuredLogger};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::errors::{WorkerError, WorkerResult};
use crate::executors::{ExecutorRegistry, JobFailure};
use crate::job_record::JobRecord;

/// 一次执行的结果分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    Retried,
    RetryStopped,
    Discarded,
    Interrupted,
}

impl JobOutcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            JobOutcome::Succeeded => "succeeded",
            JobOutcome::Retried => "retried",
            JobOutcome::RetryStopped => "retry_stopped",
            JobOutcome::Discarded => "discarded",
            JobOutcome::Interrupted => "interrupted",
        }
    }
}

/// 执行报告：作业退出作用域前的上下文快照
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: Arc<JobRecord>,
    pub outcome: JobOutcome,
    pub context: SlotSet,
    pub duration: Duration,
}

impl JobReport {
    /// 重试产生的新记录
    pub fn retried_job(&self) -> Option<&JobRecord> {
        self.context
            .retried_job
            .as_ref()
            .and_then(|job| job.downcast_ref::<JobRecord>())
    }

    /// 是否应当立即重新执行重试记录
    pub fn should_retry_now(&self) -> bool {
        self.context.retry_now == Some(true) && self.context.retried_job.is_some()
    }
}

pub struct JobExecutionManager {
    config: WorkerConfig,
    registry: Arc<ExecutorRegistry>,
    interrupted: Arc<AtomicBool>,
    permits: Arc<Semaphore>,
}

impl JobExecutionManager {
    pub fn new(config: WorkerConfig, registry: Arc<ExecutorRegistry>) -> WorkerResult<Self> {
        config.validate()?;
        let permits = Arc::new(Semaphore::new(config.max_threads));
        Ok(Self {
            config,
            registry,
            interrupted: Arc::new(AtomicBool::new(false)),
            permits,
        })
    }

    pub fn worker_id(&self) -> &str {
        &self.config.worker_id
    }

    /// 中断之后开始的作业不再执行作业体，而是立即重新排队
    pub fn interrupt(&self) {
        if !self.interrupted.swap(true, Ordering::SeqCst) {
            warn!(worker.id = self.config.worker_id.as_str(), "Worker interrupted");
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// 在调用线程上执行一个作业
    ///
    /// 作业的全部上下文写入都发生在作用域内，返回后调用线程的上下文与调用前一致。
    pub fn execute(&self, job: JobRecord) -> JobReport {
        let job = Arc::new(job);
        ThreadContext::current().within(|ctx| {
            ctx.set_job(Some(JobHandle::from(Arc::clone(&job))));
            ctx.set_cron_key(job.cron_key.clone());
            ctx.set_cron_at(job.cron_at);

            let fields = ContextFields::capture(ctx);
            let _span = JobTracer::execute_job_span(&fields, &job.job_class).entered();
            StructuredLogger::log_job_started(&fields, &job.job_class);
            let started = Instant::now();

            let outcome = if self.is_interrupted() {
                ctx.set_execution_interrupted(Some(true));
                self.schedule_retry(ctx, &job, Duration::ZERO);
                JobOutcome::Interrupted
            } else {
                self.perform(ctx, &job)
            };

            let duration = started.elapsed();
            self.report(ctx, &job, outcome, duration);

            JobReport {
                job: Arc::clone(&job),
                outcome,
                context: ctx.export_all(),
                duration,
            }
        })
    }

    /// 在阻塞线程池中执行作业，受 `max_threads` 限制
    pub async fn spawn(self: &Arc<Self>, job: JobRecord) -> WorkerResult<JobReport> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| WorkerError::Join(e.to_string()))?;
        let manager = Arc::clone(self);

        tokio::task::spawn_blocking(move || {
            let report = manager.execute(job);
            drop(permit);
            report
        })
        .await
        .map_err(|e| WorkerError::Join(e.to_string()))
    }

    fn perform(&self, ctx: &ThreadContext, job: &JobRecord) -> JobOutcome {
        let result = match self.registry.get(&job.job_class) {
            Some(executor) => executor.perform(job, ctx),
            None => Err(JobFailure::discard(WorkerError::ExecutorNotFound {
                job_class: job.job_class.clone(),
            })),
        };

        match result {
            Ok(()) => JobOutcome::Succeeded,
            Err(JobFailure::Retry { error, wait }) => {
                if job.executions + 1 < self.config.max_attempts {
                    ctx.set_error_on_retry(Some(CapturedError::from(error)));
                    let wait =
                        wait.unwrap_or(Duration::from_secs(self.config.retry_wait_seconds));
                    self.schedule_retry(ctx, job, wait);
                    JobOutcome::Retried
                } else {
                    ctx.set_error_on_retry_stopped(Some(CapturedError::from(error)));
                    JobOutcome::RetryStopped
                }
            }
            Err(JobFailure::Discard(error)) => {
                ctx.set_error_on_discard(Some(CapturedError::from(error)));
                JobOutcome::Discarded
            }
        }
    }

    fn schedule_retry(&self, ctx: &ThreadContext, job: &JobRecord, wait: Duration) {
        let scheduled_at = if wait.is_zero() {
            None
        } else {
            chrono::Duration::from_std(wait)
                .ok()
                .and_then(|wait| Utc::now().checked_add_signed(wait))
        };
        let retried = job.retry_at(scheduled_at);
        debug!(
            job.id = %retried.id,
            job.executions = retried.executions,
            "Scheduled retry"
        );

        ctx.set_retried_job(Some(JobHandle::new(retried)));
        ctx.set_retry_now(Some(wait.is_zero()));
    }

    fn report(&self, ctx: &ThreadContext, job: &JobRecord, outcome: JobOutcome, duration: Duration) {
        let fields = ContextFields::capture(ctx);
        let class = job.job_class.as_str();
        let duration_ms = duration.as_millis() as u64;

        match outcome {
            JobOutcome::Succeeded => StructuredLogger::log_job_succeeded(&fields, class, duration_ms),
            JobOutcome::Retried => {
                StructuredLogger::log_job_retried(&fields, class, duration_ms);
                JobMetrics::record_captured_error(class, Slot::ErrorOnRetry);
            }
            JobOutcome::RetryStopped => {
                StructuredLogger::log_retry_stopped(&fields, class, duration_ms);
                JobMetrics::record_captured_error(class, Slot::ErrorOnRetryStopped);
            }
            JobOutcome::Discarded => {
                StructuredLogger::log_job_discarded(&fields, class, duration_ms);
                JobMetrics::record_captured_error(class, Slot::ErrorOnDiscard);
            }
            JobOutcome::Interrupted => StructuredLogger::log_job_interrupted(&fields, class),
        }
        JobMetrics::record_outcome(class, outcome.as_str(), duration);
        StructuredLogger::log_context_snapshot(&fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(JobOutcome::Succeeded.as_str(), "succeeded");
        assert_eq!(JobOutcome::RetryStopped.as_str(), "retry_stopped");
        assert_eq!(JobOutcome::Interrupted.as_str(), "interrupted");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = WorkerConfig {
            max_attempts: 0,
            ..WorkerConfig::default()
        };
        let result = JobExecutionManager::new(config, Arc::new(ExecutorRegistry::new()));
        assert!(matches!(result, Err(WorkerError::Config(_))));
    }

    #[test]
    fn test_unknown_job_class_is_discarded() {
        let manager =
            JobExecutionManager::new(WorkerConfig::default(), Arc::new(ExecutorRegistry::new()))
                .unwrap();
        let report = manager.execute(JobRecord::new("MissingJob", serde_json::Value::Null));

        assert_eq!(report.outcome, JobOutcome::Discarded);
        let error = report.context.error_on_discard.expect("discard error");
        assert!(error.to_string().contains("MissingJob"));
        assert!(ThreadContext::current().export_all().is_empty());
    }

    #[test]
    fn test_interrupted_manager_requeues_immediately() {
        let manager =
            JobExecutionManager::new(WorkerConfig::default(), Arc::new(ExecutorRegistry::new()))
                .unwrap();
        manager.interrupt();
        assert!(manager.is_interrupted());

        let job = JobRecord::new("MissingJob", serde_json::Value::Null);
        let active_job_id = job.active_job_id;
        let report = manager.execute(job);

        assert_eq!(report.outcome, JobOutcome::Interrupted);
        assert_eq!(report.context.execution_interrupted, Some(true));
        assert!(report.should_retry_now());
        assert_eq!(report.context.error_on_discard, None);
        let retried = report.retried_job().expect("retry record");
        assert_eq!(retried.active_job_id, active_job_id);
        assert_eq!(retried.executions, 1);
    }
}
