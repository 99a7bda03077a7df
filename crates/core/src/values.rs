//! # 槽位中保存的不透明值
//!
//! 注册表只持有这些值的共享引用，不关心它们的生命周期。

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// 作业记录需要实现的最小接口
///
/// 作业记录本身由执行引擎拥有，注册表只需要读取其 ActiveJob ID。
pub trait JobReference: fmt::Debug + Send + Sync + 'static {
    /// 作业的业务标识（用于日志关联）
    fn active_job_id(&self) -> String;

    /// 用于向下转型回具体的作业记录类型
    fn as_any(&self) -> &dyn Any;
}

/// 指向作业记录的共享句柄
///
/// 相等性按引用判断：两个句柄指向同一条记录时才相等。
#[derive(Clone)]
pub struct JobHandle(Arc<dyn JobReference>);

impl JobHandle {
    pub fn new<J: JobReference>(job: J) -> Self {
        Self(Arc::new(job))
    }

    pub fn from_arc(job: Arc<dyn JobReference>) -> Self {
        Self(job)
    }

    pub fn active_job_id(&self) -> String {
        self.0.active_job_id()
    }

    pub fn downcast_ref<J: JobReference>(&self) -> Option<&J> {
        self.0.as_any().downcast_ref::<J>()
    }

    pub fn as_arc(&self) -> &Arc<dyn JobReference> {
        &self.0
    }
}

impl PartialEq for JobHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JobHandle").field(&self.0).finish()
    }
}

impl<J: JobReference> From<Arc<J>> for JobHandle {
    fn from(job: Arc<J>) -> Self {
        Self(job)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct MessageError(String);

/// 作业执行过程中捕获的错误
///
/// 克隆代价很低；相等性同样按引用判断。
#[derive(Clone)]
pub struct CapturedError(Arc<dyn StdError + Send + Sync + 'static>);

impl CapturedError {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    pub fn from_boxed(error: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self(Arc::from(error))
    }

    pub fn message<S: Into<String>>(message: S) -> Self {
        Self::new(MessageError(message.into()))
    }

    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl From<anyhow::Error> for CapturedError {
    fn from(error: anyhow::Error) -> Self {
        Self::from_boxed(error.into())
    }
}

impl PartialEq for CapturedError {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapturedError").field(&self.0).finish()
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestJob {
        id: &'static str,
    }

    impl JobReference for TestJob {
        fn active_job_id(&self) -> String {
            self.id.to_string()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_job_handle_identity() {
        let first = JobHandle::new(TestJob { id: "abc" });
        let second = JobHandle::new(TestJob { id: "abc" });

        assert_eq!(first, first.clone());
        assert_ne!(first, second);
        assert_eq!(first.active_job_id(), "abc");
        assert_eq!(first.downcast_ref::<TestJob>().map(|job| job.id), Some("abc"));
    }

    #[test]
    fn test_captured_error_from_anyhow() {
        let error = CapturedError::from(anyhow::anyhow!("connection refused"));
        assert_eq!(error.to_string(), "connection refused");
        assert_eq!(error, error.clone());
        assert_ne!(error, CapturedError::message("connection refused"));
    }

    #[test]
    fn test_captured_error_downcast() {
        let io_error = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let error = CapturedError::new(io_error);

        let inner = error.downcast_ref::<std::io::Error>().expect("io error");
        assert_eq!(inner.kind(), std::io::ErrorKind::TimedOut);
    }
}
