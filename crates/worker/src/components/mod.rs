pub mod job_execution;

pub use job_execution::{JobExecutionManager, JobOutcome, JobReport};
