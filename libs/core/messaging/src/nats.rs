//! NATS JetStream broker.

use async_nats::jetstream::{self, Context, stream};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::{Broker, MessagingError, NatsConfig};

/// Publishes change notifications to a JetStream stream.
///
/// The stream uses file storage and limits retention: messages survive a
/// server restart and every consumer reads every message.
pub struct NatsBroker {
    jetstream: Context,
    subject: String,
}

impl NatsBroker {
    /// Connect to NATS and declare the change stream.
    #[instrument(skip(config), fields(url = %config.url, stream = %config.stream))]
    pub async fn connect(config: &NatsConfig) -> Result<Self, MessagingError> {
        let client = async_nats::ConnectOptions::new()
            .name(&config.client_name)
            .connect(config.url.as_str())
            .await
            .map_err(|e| MessagingError::Connection {
                url: config.url.clone(),
                details: e.to_string(),
            })?;

        Self::with_client(client, config).await
    }

    /// Declare the change stream on an existing connection.
    pub async fn with_client(
        client: async_nats::Client,
        config: &NatsConfig,
    ) -> Result<Self, MessagingError> {
        let jetstream = jetstream::new(client);

        jetstream
            .get_or_create_stream(stream::Config {
                name: config.stream.clone(),
                subjects: vec![config.subject.clone()],
                storage: stream::StorageType::File,
                retention: stream::RetentionPolicy::Limits,
                ..Default::default()
            })
            .await
            .map_err(|e| MessagingError::Topic {
                stream: config.stream.clone(),
                details: e.to_string(),
            })?;

        info!(
            stream = %config.stream,
            subject = %config.subject,
            "User change stream ready"
        );

        Ok(Self {
            jetstream,
            subject: config.subject.clone(),
        })
    }
}

#[async_trait]
impl Broker for NatsBroker {
    async fn publish(&self, payload: String) -> Result<(), MessagingError> {
        let ack = self
            .jetstream
            .publish(self.subject.clone(), payload.into())
            .await
            .map_err(|e| MessagingError::publish(&self.subject, e))?
            .await
            .map_err(|e| MessagingError::publish(&self.subject, e))?;

        debug!(subject = %self.subject, sequence = ack.sequence, "Published");
        Ok(())
    }
}
