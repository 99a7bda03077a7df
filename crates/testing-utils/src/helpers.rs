//! Test helpers for thread context isolation

use job_context_core::ThreadContext;

/// 测试期间保持当前线程上下文干净
///
/// 创建和析构时都会清空调用线程的全部槽位。
pub struct CleanContext {
    ctx: ThreadContext,
}

impl CleanContext {
    pub fn new() -> Self {
        let ctx = ThreadContext::current();
        ctx.reset();
        Self { ctx }
    }

    pub fn ctx(&self) -> &ThreadContext {
        &self.ctx
    }
}

impl Default for CleanContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CleanContext {
    fn drop(&mut self) {
        self.ctx.reset();
    }
}

/// 在干净的上下文中执行 `f`，结束后再次清空
pub fn with_clean_context<F, R>(f: F) -> R
where
    F: FnOnce(&ThreadContext) -> R,
{
    let guard = CleanContext::new();
    f(guard.ctx())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_clean_context_clears_before_and_after() {
        let ctx = ThreadContext::current();
        ctx.set_cron_key(Some("leftover".to_string()));

        let seen = with_clean_context(|ctx| {
            let seen = ctx.cron_key();
            ctx.set_retry_now(Some(true));
            seen
        });

        assert_eq!(seen, None);
        assert!(ctx.export_all().is_empty());
    }
}
