use job_context_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("无效的CRON表达式: {expr} - {message}")]
    InvalidCron { expr: String, message: String },

    #[error("未注册的作业类型: {job_class}")]
    ExecutorNotFound { job_class: String },

    #[error("作业线程异常退出: {0}")]
    Join(String),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

pub type WorkerResult<T> = Result<T, WorkerError>;
