use async_trait::async_trait;

/// A store whose data belongs to the active household.
///
/// The session manager calls `refresh_context` after the household context
/// changes and `reset` when the session ends.
#[async_trait]
pub trait ContextRefresh: Send + Sync {
    async fn refresh_context(&self);
    fn reset(&self);
}
