//! # Job Context Testing Utils
//!
//! 各 crate 共用的测试工具：作业记录构建器、模拟作业与执行器、上下文清理守卫。
//!
//! ```toml
//! [dev-dependencies]
//! job-context-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
