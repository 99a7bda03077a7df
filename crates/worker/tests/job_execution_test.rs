use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use job_context_config::WorkerConfig;
use job_context_core::ThreadContext;
use job_context_testing_utils::{with_clean_context, FnExecutor, JobRecordBuilder, MockJob};
use job_context_worker::{
    CronEntry, ExecutorRegistry, JobExecutionManager, JobFailure, JobOutcome, JobRecord,
};

fn manager_with(executors: Vec<Arc<FnExecutor>>) -> JobExecutionManager {
    let mut registry = ExecutorRegistry::new();
    for executor in executors {
        registry.register(executor);
    }
    JobExecutionManager::new(WorkerConfig::default(), Arc::new(registry)).unwrap()
}

#[test]
fn test_successful_job_sees_its_own_context() {
    let executor = Arc::new(FnExecutor::new("MailerJob", |job, ctx| {
        assert_eq!(ctx.active_job_id(), Some(job.active_job_id.to_string()));
        assert_eq!(ctx.cron_key(), None);
        Ok(())
    }));
    let manager = manager_with(vec![Arc::clone(&executor)]);

    with_clean_context(|ctx| {
        let report = manager.execute(JobRecordBuilder::new().with_job_class("MailerJob").build());

        assert_eq!(report.outcome, JobOutcome::Succeeded);
        assert_eq!(executor.calls(), 1);
        assert!(report.context.job.is_some());
        assert_eq!(report.context.error_on_retry, None);
        assert!(ctx.export_all().is_empty());
    });
}

#[test]
fn test_retry_with_attempts_remaining() {
    let executor = Arc::new(FnExecutor::new("FlakyJob", |_, _| {
        Err(JobFailure::retry(anyhow::anyhow!("connection reset")))
    }));
    let manager = manager_with(vec![executor]);
    let job = JobRecordBuilder::new().with_job_class("FlakyJob").build();
    let active_job_id = job.active_job_id;

    let report = manager.execute(job);

    assert_eq!(report.outcome, JobOutcome::Retried);
    assert_eq!(
        report.context.error_on_retry.as_ref().map(ToString::to_string),
        Some("connection reset".to_string())
    );
    assert!(report.should_retry_now());
    let retried = report.retried_job().expect("retry record");
    assert_eq!(retried.active_job_id, active_job_id);
    assert_eq!(retried.executions, 1);
    assert_eq!(retried.scheduled_at, None);
}

#[test]
fn test_retry_with_wait_is_not_immediate() {
    let executor = Arc::new(FnExecutor::new("SlowJob", |_, _| {
        Err(JobFailure::retry_after(
            anyhow::anyhow!("rate limited"),
            Duration::from_secs(30),
        ))
    }));
    let manager = manager_with(vec![executor]);

    let report = manager.execute(JobRecordBuilder::new().with_job_class("SlowJob").build());

    assert_eq!(report.outcome, JobOutcome::Retried);
    assert_eq!(report.context.retry_now, Some(false));
    assert!(!report.should_retry_now());
    assert!(report.retried_job().and_then(|job| job.scheduled_at).is_some());
}

#[test]
fn test_retry_stopped_when_attempts_exhausted() {
    let executor = Arc::new(FnExecutor::new("FlakyJob", |_, _| {
        Err(JobFailure::retry(anyhow::anyhow!("still failing")))
    }));
    let manager = manager_with(vec![executor]);
    let job = JobRecordBuilder::new()
        .with_job_class("FlakyJob")
        .with_executions(2)
        .build();

    let report = manager.execute(job);

    assert_eq!(report.outcome, JobOutcome::RetryStopped);
    assert!(report.context.error_on_retry_stopped.is_some());
    assert_eq!(report.context.error_on_retry, None);
    assert_eq!(report.context.retried_job, None);
    assert_eq!(report.context.retry_now, None);
}

#[test]
fn test_discarded_job_records_error() {
    let executor = Arc::new(FnExecutor::new("ImportJob", |_, _| {
        Err(JobFailure::discard(anyhow::anyhow!("malformed payload")))
    }));
    let manager = manager_with(vec![executor]);

    let report = manager.execute(JobRecordBuilder::new().with_job_class("ImportJob").build());

    assert_eq!(report.outcome, JobOutcome::Discarded);
    assert_eq!(
        report.context.error_on_discard.map(|e| e.to_string()),
        Some("malformed payload".to_string())
    );
}

#[test]
fn test_cron_job_exposes_cron_slots() {
    let at = Utc.with_ymd_and_hms(2024, 3, 2, 6, 0, 0).unwrap();
    let executor = Arc::new(FnExecutor::new("ReportJob", move |_, ctx| {
        assert_eq!(ctx.cron_key().as_deref(), Some("daily_report"));
        assert_eq!(ctx.cron_at(), Some(at));
        Ok(())
    }));
    let manager = manager_with(vec![Arc::clone(&executor)]);
    let entry = CronEntry::new("daily_report", "ReportJob", "0 0 6 * * *").unwrap();

    let job = entry
        .next_job(Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap())
        .unwrap();
    let report = manager.execute(job);

    assert_eq!(report.outcome, JobOutcome::Succeeded);
    assert_eq!(report.context.cron_key.as_deref(), Some("daily_report"));
    assert_eq!(executor.calls(), 1);
}

#[test]
fn test_interrupted_manager_skips_body() {
    let executor = Arc::new(FnExecutor::succeeding("MailerJob"));
    let manager = manager_with(vec![Arc::clone(&executor)]);
    manager.interrupt();

    let report = manager.execute(JobRecordBuilder::new().with_job_class("MailerJob").build());

    assert_eq!(report.outcome, JobOutcome::Interrupted);
    assert_eq!(executor.calls(), 0);
    assert_eq!(report.context.execution_interrupted, Some(true));
    assert!(report.should_retry_now());
}

#[test]
fn test_execute_restores_outer_context() {
    let manager = manager_with(vec![Arc::new(FnExecutor::succeeding("MailerJob"))]);
    let outer = MockJob::handle("outer");

    with_clean_context(|ctx| {
        ctx.set_job(Some(outer.clone()));
        ctx.set_cron_key(Some("outer-cron".to_string()));
        let before = ctx.export_all();

        let report = manager.execute(JobRecordBuilder::new().with_job_class("MailerJob").build());

        assert_ne!(report.context.job, Some(outer.clone()));
        assert_eq!(report.context.cron_key, None);
        assert_eq!(ctx.export_all(), before);
    });
}

#[test]
fn test_sequential_jobs_on_one_thread_do_not_share_state() {
    let failing = Arc::new(FnExecutor::new("FlakyJob", |_, _| {
        Err(JobFailure::retry(anyhow::anyhow!("transient")))
    }));
    let clean = Arc::new(FnExecutor::new("MailerJob", |_, ctx| {
        assert_eq!(ctx.error_on_retry(), None);
        assert_eq!(ctx.retried_job(), None);
        assert_eq!(ctx.retry_now(), None);
        Ok(())
    }));
    let manager = manager_with(vec![failing, Arc::clone(&clean)]);

    with_clean_context(|ctx| {
        let first = manager.execute(JobRecordBuilder::new().with_job_class("FlakyJob").build());
        let second = manager.execute(JobRecordBuilder::new().with_job_class("MailerJob").build());

        assert_eq!(first.outcome, JobOutcome::Retried);
        assert_eq!(second.outcome, JobOutcome::Succeeded);
        assert_eq!(clean.calls(), 1);
        assert_ne!(first.context.job, second.context.job);
        assert!(ctx.export_all().is_empty());
    });
}

#[test]
fn test_panicking_job_restores_context() {
    let executor = Arc::new(FnExecutor::new("CrashJob", |_, ctx| {
        ctx.set_retry_now(Some(true));
        panic!("boom");
    }));
    let manager = manager_with(vec![executor]);

    with_clean_context(|ctx| {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            manager.execute(JobRecordBuilder::new().with_job_class("CrashJob").build())
        }));

        assert!(result.is_err());
        assert!(ctx.export_all().is_empty());
    });
}

#[tokio::test]
async fn test_spawn_runs_on_blocking_thread() {
    let executor = Arc::new(FnExecutor::new("MailerJob", |job, ctx| {
        assert_eq!(ctx.active_job_id(), Some(job.active_job_id.to_string()));
        Ok(())
    }));
    let manager = Arc::new(manager_with(vec![executor]));

    let jobs: Vec<JobRecord> = (0..4)
        .map(|_| JobRecordBuilder::new().with_job_class("MailerJob").build())
        .collect();
    let mut reports = Vec::new();
    for job in jobs {
        reports.push(manager.spawn(job).await.unwrap());
    }

    assert!(reports.iter().all(|r| r.outcome == JobOutcome::Succeeded));
    assert_eq!(ThreadContext::current().job(), None);
}

#[tokio::test]
async fn test_spawn_reports_panic_as_join_error() {
    let executor = Arc::new(FnExecutor::new("CrashJob", |_, _| panic!("boom")));
    let manager = Arc::new(manager_with(vec![executor]));

    let result = manager
        .spawn(JobRecordBuilder::new().with_job_class("CrashJob").build())
        .await;

    assert!(matches!(result, Err(job_context_worker::WorkerError::Join(_))));
}
