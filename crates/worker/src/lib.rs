//! # 作业执行引擎
//!
//! 在阻塞线程上执行作业，并通过线程上下文记录每次执行的结果。

pub mod components;
pub mod cron_entry;
pub mod errors;
pub mod executors;
pub mod job_record;

pub use components::{JobExecutionManager, JobOutcome, JobReport};
pub use cron_entry::CronEntry;
pub use errors::{WorkerError, WorkerResult};
pub use executors::{ExecutorRegistry, JobExecutor, JobFailure};
pub use job_record::JobRecord;
