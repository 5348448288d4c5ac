use async_trait::async_trait;

use crate::MessagingError;

/// Destination of change notifications.
///
/// Called from a single worker task only, so implementations never see
/// concurrent publishes.
#[async_trait]
pub trait Broker: Send + Sync + 'static {
    /// Publish one message body to the change topic.
    async fn publish(&self, payload: String) -> Result<(), MessagingError>;
}
