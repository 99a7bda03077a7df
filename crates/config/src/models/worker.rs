use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerConfig {
    pub worker_id: String,
    /// 执行作业的阻塞线程上限
    pub max_threads: usize,
    /// 包括首次执行在内的最大尝试次数
    pub max_attempts: u32,
    /// 重试前的等待时间，0 表示立即重试
    pub retry_wait_seconds: u64,
    pub thread_name_prefix: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_id: "worker-001".to_string(),
            max_threads: 4,
            max_attempts: 3,
            retry_wait_seconds: 0,
            thread_name_prefix: "job-worker".to_string(),
        }
    }
}

impl ConfigValidator for WorkerConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.worker_id, "worker.worker_id")?;
        ValidationUtils::validate_not_empty(&self.thread_name_prefix, "worker.thread_name_prefix")?;
        ValidationUtils::validate_count(self.max_threads, "worker.max_threads", 512)?;
        ValidationUtils::validate_count(self.max_attempts as usize, "worker.max_attempts", 100)?;
        ValidationUtils::validate_seconds(self.retry_wait_seconds, "worker.retry_wait_seconds")?;
        Ok(())
    }
}
