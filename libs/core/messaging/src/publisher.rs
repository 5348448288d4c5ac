use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{Broker, NatsBroker, NatsConfig};

/// Receives "this user changed" events from the domain layer.
pub trait ChangeNotifier: Send + Sync {
    /// Hand off a change event. Must return immediately and never fail.
    fn notify(&self, id: Uuid);
}

/// Queue in front of a single delivery worker.
///
/// Cloning is cheap and every clone feeds the same worker. The worker exits
/// once the last clone is dropped and the queue is drained.
#[derive(Clone, Debug)]
pub struct ChangePublisher {
    queue: Option<mpsc::UnboundedSender<Uuid>>,
}

impl ChangePublisher {
    /// Spawn the delivery worker for `broker`. Must be called inside a tokio runtime.
    pub fn start<B: Broker>(broker: B) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(deliver(broker, rx));
        (Self { queue: Some(tx) }, worker)
    }

    /// A publisher that accepts and discards every notification.
    pub fn disconnected() -> Self {
        Self { queue: None }
    }

    /// Connect to NATS and start delivering.
    ///
    /// Setup failure is logged and yields a disconnected publisher. No
    /// reconnection is attempted later.
    pub async fn connect(config: &NatsConfig) -> (Self, Option<JoinHandle<()>>) {
        match NatsBroker::connect(config).await {
            Ok(broker) => {
                let (publisher, worker) = Self::start(broker);
                (publisher, Some(worker))
            }
            Err(e) => {
                error!(
                    error = %e,
                    "Broker setup failed, user change notifications are disabled"
                );
                (Self::disconnected(), None)
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.queue.as_ref().is_some_and(|tx| !tx.is_closed())
    }
}

impl ChangeNotifier for ChangePublisher {
    fn notify(&self, id: Uuid) {
        match &self.queue {
            Some(tx) => {
                if tx.send(id).is_err() {
                    warn!(user_id = %id, "Delivery worker is gone, dropping change notification");
                }
            }
            None => debug!(user_id = %id, "No broker, dropping change notification"),
        }
    }
}

async fn deliver<B: Broker>(broker: B, mut queue: mpsc::UnboundedReceiver<Uuid>) {
    info!("User change delivery worker started");

    while let Some(id) = queue.recv().await {
        match broker.publish(id.to_string()).await {
            Ok(()) => debug!(user_id = %id, "Published user change"),
            Err(e) => error!(user_id = %id, error = %e, "Failed to publish user change"),
        }
    }

    info!("User change delivery worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessagingError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    #[derive(Clone, Default)]
    struct RecordingBroker {
        published: Arc<Mutex<Vec<String>>>,
        attempts: Arc<AtomicUsize>,
        fail_on: Option<usize>,
    }

    impl RecordingBroker {
        fn failing_on(attempt: usize) -> Self {
            Self {
                fail_on: Some(attempt),
                ..Self::default()
            }
        }

        fn published(&self) -> Vec<String> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Broker for RecordingBroker {
        async fn publish(&self, payload: String) -> Result<(), MessagingError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(attempt) {
                return Err(MessagingError::publish("users.changed", "channel closed"));
            }
            self.published.lock().unwrap().push(payload);
            Ok(())
        }
    }

    /// Holds every publish until a permit is released.
    struct GatedBroker {
        gate: Arc<Semaphore>,
        inner: RecordingBroker,
    }

    #[async_trait]
    impl Broker for GatedBroker {
        async fn publish(&self, payload: String) -> Result<(), MessagingError> {
            self.gate.acquire().await.unwrap().forget();
            self.inner.publish(payload).await
        }
    }

    struct InFlightCounter {
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Broker for InFlightCounter {
        async fn publish(&self, _payload: String) -> Result<(), MessagingError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(1)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_delivers_in_enqueue_order() {
        let broker = RecordingBroker::default();
        let (publisher, worker) = ChangePublisher::start(broker.clone());

        let ids: Vec<Uuid> = (0..50).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            publisher.notify(*id);
        }
        drop(publisher);
        worker.await.unwrap();

        let expected: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        assert_eq!(broker.published(), expected);
    }

    #[tokio::test]
    async fn test_publish_failure_drops_only_that_event() {
        let broker = RecordingBroker::failing_on(1);
        let (publisher, worker) = ChangePublisher::start(broker.clone());

        let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        for id in ids {
            publisher.notify(id);
        }
        drop(publisher);
        worker.await.unwrap();

        assert_eq!(broker.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(broker.published(), vec![ids[0].to_string(), ids[2].to_string()]);
    }

    #[tokio::test]
    async fn test_notify_does_not_wait_for_broker() {
        let gate = Arc::new(Semaphore::new(0));
        let inner = RecordingBroker::default();
        let (publisher, worker) = ChangePublisher::start(GatedBroker {
            gate: gate.clone(),
            inner: inner.clone(),
        });

        let id = Uuid::new_v4();
        publisher.notify(id);
        publisher.notify(id);
        tokio::task::yield_now().await;
        assert!(inner.published().is_empty());

        gate.add_permits(2);
        drop(publisher);
        worker.await.unwrap();
        assert_eq!(inner.published(), vec![id.to_string(), id.to_string()]);
    }

    #[tokio::test]
    async fn test_single_publish_in_flight() {
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let (publisher, worker) = ChangePublisher::start(InFlightCounter {
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: max_in_flight.clone(),
        });

        let producers: Vec<_> = (0..8)
            .map(|_| {
                let publisher = publisher.clone();
                tokio::spawn(async move {
                    for _ in 0..5 {
                        publisher.notify(Uuid::new_v4());
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.await.unwrap();
        }
        drop(publisher);
        worker.await.unwrap();

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disconnected_publisher_discards() {
        let publisher = ChangePublisher::disconnected();
        assert!(!publisher.is_connected());
        publisher.notify(Uuid::new_v4());
    }

    #[tokio::test]
    async fn test_connect_failure_yields_disconnected_publisher() {
        let config = NatsConfig {
            url: "nats://127.0.0.1:1".to_string(),
            ..NatsConfig::default()
        };

        let (publisher, worker) = ChangePublisher::connect(&config).await;

        assert!(!publisher.is_connected());
        assert!(worker.is_none());
        publisher.notify(Uuid::new_v4());
    }
}
