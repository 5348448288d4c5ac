use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Failed to connect to NATS at {url}: {details}")]
    Connection { url: String, details: String },

    #[error("Failed to declare stream '{stream}': {details}")]
    Topic { stream: String, details: String },

    #[error("Failed to publish to '{subject}': {details}")]
    Publish { subject: String, details: String },
}

impl MessagingError {
    pub fn publish(subject: &str, details: impl ToString) -> Self {
        Self::Publish {
            subject: subject.to_string(),
            details: details.to_string(),
        }
    }
}
