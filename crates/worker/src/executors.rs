use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use job_context_core::ThreadContext;
use thiserror::Error;

use crate::job_record::JobRecord;

/// 作业体报告的失败结果
///
/// 作业执行引擎根据这里的变体决定写入哪个错误槽位。
#[derive(Debug, Error)]
pub enum JobFailure {
    /// 请求重试；`wait` 为空时使用 Worker 配置的等待时间
    #[error("retry requested: {error}")]
    Retry {
        error: anyhow::Error,
        wait: Option<Duration>,
    },
    /// 直接丢弃，不再重试
    #[error("discarded: {0}")]
    Discard(anyhow::Error),
}

impl JobFailure {
    pub fn retry(error: impl Into<anyhow::Error>) -> Self {
        Self::Retry {
            error: error.into(),
            wait: None,
        }
    }

    pub fn retry_after(error: impl Into<anyhow::Error>, wait: Duration) -> Self {
        Self::Retry {
            error: error.into(),
            wait: Some(wait),
        }
    }

    pub fn discard(error: impl Into<anyhow::Error>) -> Self {
        Self::Discard(error.into())
    }
}

/// 作业执行器
///
/// `perform` 在作业所属的阻塞线程上同步执行，可以通过 `ctx` 读写当前线程上下文。
pub trait JobExecutor: Send + Sync {
    fn job_class(&self) -> &str;

    fn perform(&self, job: &JobRecord, ctx: &ThreadContext) -> Result<(), JobFailure>;
}

#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn JobExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册执行器，同名执行器会被替换
    pub fn register(&mut self, executor: Arc<dyn JobExecutor>) -> Option<Arc<dyn JobExecutor>> {
        self.executors
            .insert(executor.job_class().to_string(), executor)
    }

    pub fn with(mut self, executor: Arc<dyn JobExecutor>) -> Self {
        self.register(executor);
        self
    }

    pub fn get(&self, job_class: &str) -> Option<Arc<dyn JobExecutor>> {
        self.executors.get(job_class).cloned()
    }

    pub fn contains(&self, job_class: &str) -> bool {
        self.executors.contains_key(job_class)
    }

    pub fn job_classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self.executors.keys().cloned().collect();
        classes.sort();
        classes
    }
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("job_classes", &self.job_classes())
            .finish()
    }
}
