//! Mock implementations for job references and executors

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};

use job_context_core::{JobHandle, JobReference, ThreadContext};
use job_context_worker::{JobExecutor, JobFailure, JobRecord};

/// 只携带 ActiveJob ID 的最小作业
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockJob {
    pub id: String,
}

impl MockJob {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// 直接构造一个作业句柄
    pub fn handle(id: impl Into<String>) -> JobHandle {
        JobHandle::new(Self::new(id))
    }
}

impl JobReference for MockJob {
    fn active_job_id(&self) -> String {
        self.id.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

type PerformFn = dyn Fn(&JobRecord, &ThreadContext) -> Result<(), JobFailure> + Send + Sync;

/// 由闭包实现的执行器，并记录调用次数
pub struct FnExecutor {
    job_class: String,
    perform: Box<PerformFn>,
    calls: AtomicUsize,
}

impl FnExecutor {
    pub fn new<F>(job_class: impl Into<String>, perform: F) -> Self
    where
        F: Fn(&JobRecord, &ThreadContext) -> Result<(), JobFailure> + Send + Sync + 'static,
    {
        Self {
            job_class: job_class.into(),
            perform: Box::new(perform),
            calls: AtomicUsize::new(0),
        }
    }

    /// 总是成功的执行器
    pub fn succeeding(job_class: impl Into<String>) -> Self {
        Self::new(job_class, |_, _| Ok(()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl JobExecutor for FnExecutor {
    fn job_class(&self) -> &str {
        &self.job_class
    }

    fn perform(&self, job: &JobRecord, ctx: &ThreadContext) -> Result<(), JobFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.perform)(job, ctx)
    }
}
