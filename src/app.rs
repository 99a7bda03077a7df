use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use futures::future::join_all;
use job_context_config::AppConfig;
use job_context_core::ThreadContext;
use job_context_worker::{
    CronEntry, ExecutorRegistry, JobExecutionManager, JobExecutor, JobFailure, JobOutcome,
    JobRecord, JobReport,
};
use tracing::{info, warn};

/// 演示用执行器：打印参数并成功返回
pub struct EchoExecutor {
    job_class: String,
}

impl EchoExecutor {
    pub fn new(job_class: impl Into<String>) -> Self {
        Self {
            job_class: job_class.into(),
        }
    }
}

impl JobExecutor for EchoExecutor {
    fn job_class(&self) -> &str {
        &self.job_class
    }

    fn perform(&self, job: &JobRecord, ctx: &ThreadContext) -> Result<(), JobFailure> {
        let active_job_id = ctx.active_job_id().unwrap_or_default();
        let thread_name = ctx.thread_name();
        info!(
            job.active_job_id = active_job_id.as_str(),
            thread.name = thread_name.as_str(),
            arguments = %job.arguments,
            "Echo"
        );
        Ok(())
    }
}

/// 演示用执行器：第一次执行失败并请求立即重试
pub struct FlakyExecutor;

impl JobExecutor for FlakyExecutor {
    fn job_class(&self) -> &str {
        "FlakyJob"
    }

    fn perform(&self, job: &JobRecord, _ctx: &ThreadContext) -> Result<(), JobFailure> {
        if job.executions == 0 {
            return Err(JobFailure::retry(anyhow::anyhow!(
                "upstream unavailable on first attempt"
            )));
        }
        Ok(())
    }
}

/// 演示用执行器：参数缺失时丢弃作业
pub struct RejectExecutor;

impl JobExecutor for RejectExecutor {
    fn job_class(&self) -> &str {
        "RejectJob"
    }

    fn perform(&self, job: &JobRecord, _ctx: &ThreadContext) -> Result<(), JobFailure> {
        match job.arguments.get("payload") {
            Some(_) => Ok(()),
            None => Err(JobFailure::discard(anyhow::anyhow!("missing payload argument"))),
        }
    }
}

/// 各结果的计数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoSummary {
    pub succeeded: usize,
    pub retried: usize,
    pub retry_stopped: usize,
    pub discarded: usize,
    pub interrupted: usize,
}

impl DemoSummary {
    fn record(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Succeeded => self.succeeded += 1,
            JobOutcome::Retried => self.retried += 1,
            JobOutcome::RetryStopped => self.retry_stopped += 1,
            JobOutcome::Discarded => self.discarded += 1,
            JobOutcome::Interrupted => self.interrupted += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.retried + self.retry_stopped + self.discarded + self.interrupted
    }
}

pub struct DemoApp {
    manager: Arc<JobExecutionManager>,
    cron: CronEntry,
    jobs: usize,
    max_attempts: u32,
}

impl DemoApp {
    pub fn new(config: &AppConfig, jobs: usize) -> Result<Self> {
        let registry = ExecutorRegistry::new()
            .with(Arc::new(EchoExecutor::new("EchoJob")))
            .with(Arc::new(EchoExecutor::new("ReportJob")))
            .with(Arc::new(FlakyExecutor))
            .with(Arc::new(RejectExecutor));

        let manager = JobExecutionManager::new(config.worker.clone(), Arc::new(registry))?;
        let cron = CronEntry::new("minutely_report", "ReportJob", "0 * * * * *")?;

        Ok(Self {
            manager: Arc::new(manager),
            cron,
            jobs,
            max_attempts: config.worker.max_attempts,
        })
    }

    pub fn manager(&self) -> Arc<JobExecutionManager> {
        Arc::clone(&self.manager)
    }

    /// 生成演示作业：普通作业轮流使用三种执行器，另加两次 cron 触发
    pub fn initial_jobs(&self) -> Vec<JobRecord> {
        let classes = ["EchoJob", "FlakyJob", "RejectJob"];
        let mut jobs: Vec<JobRecord> = (0..self.jobs)
            .map(|i| {
                JobRecord::new(classes[i % classes.len()], serde_json::json!({ "index": i }))
            })
            .collect();

        let cron_times = self.cron.upcoming(Utc::now(), 2);
        jobs.extend(cron_times.into_iter().map(|at| self.cron.build_job(at)));
        jobs
    }

    /// 执行全部作业；需要立即重试的作业会在下一轮重新执行
    pub async fn run(&self) -> Result<DemoSummary> {
        let mut summary = DemoSummary::default();
        let mut pending = self.initial_jobs();
        info!(
            worker.id = self.manager.worker_id(),
            jobs = pending.len(),
            "Starting demo run"
        );

        for round in 0..self.max_attempts {
            if pending.is_empty() {
                break;
            }

            let results = join_all(pending.drain(..).map(|job| self.manager.spawn(job))).await;
            for result in results {
                let report = result?;
                summary.record(report.outcome);
                if let Some(next) = self.follow_up(&report) {
                    pending.push(next);
                }
            }

            if self.manager.is_interrupted() {
                warn!(round, remaining = pending.len(), "Demo run interrupted");
                break;
            }
        }

        info!(
            succeeded = summary.succeeded,
            retried = summary.retried,
            retry_stopped = summary.retry_stopped,
            discarded = summary.discarded,
            interrupted = summary.interrupted,
            "Demo run finished"
        );
        Ok(summary)
    }

    fn follow_up(&self, report: &JobReport) -> Option<JobRecord> {
        if !report.should_retry_now() {
            if let Some(job) = report.retried_job() {
                info!(
                    job.active_job_id = %job.active_job_id,
                    scheduled_at = ?job.scheduled_at,
                    "Retry scheduled for later"
                );
            }
            return None;
        }
        report.retried_job().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_demo_run_outcomes() {
        let app = DemoApp::new(&AppConfig::default(), 6).unwrap();
        let summary = app.run().await.unwrap();

        // 6 个普通作业 + 2 次 cron 触发；FlakyJob 第二次执行成功
        assert_eq!(summary.retried, 2);
        assert_eq!(summary.discarded, 2);
        assert_eq!(summary.succeeded, 2 + 2 + 2);
        assert_eq!(summary.total(), 10);
    }

    #[tokio::test]
    async fn test_interrupted_run_stops_requeueing() {
        let app = DemoApp::new(&AppConfig::default(), 3).unwrap();
        app.manager().interrupt();

        let summary = app.run().await.unwrap();
        assert_eq!(summary.interrupted, 5);
        assert_eq!(summary.total(), 5);
    }

    #[test]
    fn test_initial_jobs_include_cron_runs() {
        let app = DemoApp::new(&AppConfig::default(), 3).unwrap();
        let jobs = app.initial_jobs();

        assert_eq!(jobs.len(), 5);
        assert_eq!(jobs.iter().filter(|job| job.is_cron()).count(), 2);
        assert!(jobs
            .iter()
            .filter(|job| job.is_cron())
            .all(|job| job.cron_key.as_deref() == Some("minutely_report")));
    }
}
