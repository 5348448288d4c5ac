use core_config::{ConfigError, FromEnv, env_or_default};

/// Where user change notifications go.
#[derive(Clone, Debug)]
pub struct NatsConfig {
    pub url: String,
    /// JetStream stream holding the change topic
    pub stream: String,
    pub subject: String,
    pub client_name: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            stream: "USER_CHANGES".to_string(),
            subject: "users.changed".to_string(),
            client_name: "usermanager".to_string(),
        }
    }
}

impl FromEnv for NatsConfig {
    /// - NATS_URL: defaults to nats://localhost:4222
    /// - NOTIFICATION_QUEUE: stream name, defaults to USER_CHANGES
    /// - NOTIFICATION_SUBJECT: defaults to users.changed
    /// - NATS_CLIENT_NAME: defaults to usermanager
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            url: env_or_default("NATS_URL", &defaults.url),
            stream: env_or_default("NOTIFICATION_QUEUE", &defaults.stream),
            subject: env_or_default("NOTIFICATION_SUBJECT", &defaults.subject),
            client_name: env_or_default("NATS_CLIENT_NAME", &defaults.client_name),
        })
    }
}
