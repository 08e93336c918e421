//! Subscriber registry and fan-out.

use super::errors::{HubError, HubResult};
use log::{debug, info, warn};
use std::{
    collections::HashMap,
    sync::{Arc, Weak},
};
use tokio::sync::{
    Mutex, RwLock,
    mpsc::{self, error::TrySendError},
};

/// Default number of undelivered messages a subscriber may hold
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

type SharedReceiver = Arc<Mutex<mpsc::Receiver<String>>>;

/// One subscriber's queue as seen by the hub.
///
/// The hub only keeps a weak reference to the receiving end, so a queue whose
/// handles were all dropped without a release is pruned on the next send.
struct Queue {
    sender: mpsc::Sender<String>,
    receiver: Weak<Mutex<mpsc::Receiver<String>>>,
}

#[derive(Default)]
struct Registry {
    queues: HashMap<String, Queue>,
    shut_down: bool,
}

/// Handle to a subscriber's message queue.
///
/// Clones share the same queue. Once the subscriber is released (or the hub
/// shuts down) the handle yields the messages still buffered and then `None`.
#[derive(Clone, Debug)]
pub struct Subscription {
    id: String,
    receiver: SharedReceiver,
}

impl Subscription {
    /// Subscriber ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the next message. Returns `None` once the queue is closed
    /// and drained.
    pub async fn recv(&self) -> Option<String> {
        self.receiver.lock().await.recv().await
    }

    /// Take the next message if one is ready.
    pub fn try_recv(&self) -> Option<String> {
        let mut receiver = self.receiver.try_lock().ok()?;
        receiver.try_recv().ok()
    }
}

/// Publish/subscribe registry fanning event tags out to subscriber queues
pub struct EventHub {
    capacity: usize,
    registry: RwLock<Registry>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_CAPACITY)
    }
}

impl EventHub {
    /// Create a hub whose queues each buffer up to `capacity` messages
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            registry: RwLock::new(Registry::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the queue for `subscriber_id`, creating it if needed.
    ///
    /// Acquiring a live id again hands back the same queue.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Closed`] after [`EventHub::shutdown`].
    pub async fn acquire(&self, subscriber_id: &str) -> HubResult<Subscription> {
        let mut registry = self.registry.write().await;
        if registry.shut_down {
            return Err(HubError::Closed);
        }

        if let Some(queue) = registry.queues.get(subscriber_id)
            && let Some(receiver) = queue.receiver.upgrade()
        {
            return Ok(Subscription {
                id: subscriber_id.to_string(),
                receiver,
            });
        }

        let (sender, receiver) = mpsc::channel(self.capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        registry.queues.insert(
            subscriber_id.to_string(),
            Queue {
                sender,
                receiver: Arc::downgrade(&receiver),
            },
        );
        debug!("Subscriber {} acquired", subscriber_id);

        Ok(Subscription {
            id: subscriber_id.to_string(),
            receiver,
        })
    }

    /// Close and forget a subscriber's queue. Returns whether it existed.
    pub async fn release(&self, subscriber_id: &str) -> bool {
        let removed = self
            .registry
            .write()
            .await
            .queues
            .remove(subscriber_id)
            .is_some();
        if removed {
            debug!("Subscriber {} released", subscriber_id);
        }
        removed
    }

    /// Deliver `message` to every acquired queue without waiting on any of
    /// them. Returns how many queues accepted it.
    pub async fn send(&self, message: &str) -> usize {
        // Snapshot the senders so delivery never holds the registry lock.
        let targets: Vec<(String, mpsc::Sender<String>)> = {
            let registry = self.registry.read().await;
            registry
                .queues
                .iter()
                .map(|(id, queue)| (id.clone(), queue.sender.clone()))
                .collect()
        };

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, sender) in targets {
            match sender.try_send(message.to_string()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!("Subscriber {} queue full, dropping '{}'", id, message);
                }
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        }

        if !closed.is_empty() {
            let mut registry = self.registry.write().await;
            for id in closed {
                // The id may have been re-acquired since the snapshot.
                if registry
                    .queues
                    .get(&id)
                    .is_some_and(|queue| queue.sender.is_closed())
                {
                    registry.queues.remove(&id);
                    debug!("Subscriber {} disconnected, removing", id);
                }
            }
        }

        delivered
    }

    /// Close every queue and refuse new subscribers from now on
    pub async fn shutdown(&self) {
        let mut registry = self.registry.write().await;
        registry.shut_down = true;
        let count = registry.queues.len();
        registry.queues.clear();
        info!("Event hub shut down, closed {} queue(s)", count);
    }

    pub async fn is_shutdown(&self) -> bool {
        self.registry.read().await.shut_down
    }

    pub async fn subscriber_count(&self) -> usize {
        self.registry.read().await.queues.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_send_without_subscribers() {
        let hub = EventHub::new(4);
        let delivered = timeout(Duration::from_millis(100), hub.send("newgame"))
            .await
            .expect("send should not block");
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_acquire_then_send_then_read() {
        let hub = EventHub::new(4);
        let sub = hub.acquire("x").await.unwrap();

        assert_eq!(hub.send("claim:alice").await, 1);
        assert_eq!(sub.recv().await.as_deref(), Some("claim:alice"));
        assert_eq!(sub.try_recv(), None);
    }

    #[tokio::test]
    async fn test_release_then_acquire_starts_empty() {
        let hub = EventHub::new(4);
        let _sub = hub.acquire("x").await.unwrap();
        hub.send("one").await;
        hub.send("two").await;

        assert!(hub.release("x").await);
        let sub = hub.acquire("x").await.unwrap();
        assert_eq!(sub.try_recv(), None);

        hub.send("three").await;
        assert_eq!(sub.try_recv().as_deref(), Some("three"));
    }

    #[tokio::test]
    async fn test_release_closes_existing_handles() {
        let hub = EventHub::new(4);
        let sub = hub.acquire("x").await.unwrap();
        hub.send("last").await;
        hub.release("x").await;

        assert_eq!(sub.recv().await.as_deref(), Some("last"));
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn test_release_unknown_subscriber() {
        let hub = EventHub::new(4);
        assert!(!hub.release("ghost").await);
    }

    #[tokio::test]
    async fn test_acquire_is_idempotent_for_live_id() {
        let hub = EventHub::new(4);
        let first = hub.acquire("x").await.unwrap();
        let second = hub.acquire("x").await.unwrap();
        assert_eq!(hub.subscriber_count().await, 1);

        hub.send("a").await;
        hub.send("b").await;
        assert_eq!(first.try_recv().as_deref(), Some("a"));
        assert_eq!(second.try_recv().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_full_queue_drops_newest() {
        let hub = EventHub::new(2);
        let slow = hub.acquire("slow").await.unwrap();
        let fast = hub.acquire("fast").await.unwrap();

        assert_eq!(hub.send("a").await, 2);
        assert_eq!(fast.try_recv().as_deref(), Some("a"));
        assert_eq!(hub.send("b").await, 2);
        assert_eq!(fast.try_recv().as_deref(), Some("b"));
        assert_eq!(hub.send("c").await, 1);
        assert_eq!(fast.try_recv().as_deref(), Some("c"));

        assert_eq!(slow.try_recv().as_deref(), Some("a"));
        assert_eq!(slow.try_recv().as_deref(), Some("b"));
        assert_eq!(slow.try_recv(), None);
    }

    #[tokio::test]
    async fn test_dropped_handles_are_pruned() {
        let hub = EventHub::new(4);
        let sub = hub.acquire("x").await.unwrap();
        drop(sub);

        assert_eq!(hub.send("ping").await, 0);
        assert_eq!(hub.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn test_shutdown_closes_queues() {
        let hub = EventHub::new(4);
        let sub = hub.acquire("x").await.unwrap();
        hub.shutdown().await;

        assert!(hub.is_shutdown().await);
        assert_eq!(sub.recv().await, None);
        assert_eq!(hub.acquire("y").await.unwrap_err(), HubError::Closed);
        assert_eq!(hub.send("late").await, 0);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let hub = EventHub::new(0);
        assert_eq!(hub.capacity(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_subscribers() {
        let hub = Arc::new(EventHub::new(64));
        let mut subs = Vec::new();
        for i in 0..10 {
            subs.push(hub.acquire(&format!("sub-{i}")).await.unwrap());
        }

        let mut tasks = Vec::new();
        for i in 0..5 {
            let hub = hub.clone();
            tasks.push(tokio::spawn(async move {
                hub.send(&format!("msg-{i}")).await
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), 10);
        }

        for sub in subs {
            let mut count = 0;
            while sub.try_recv().is_some() {
                count += 1;
            }
            assert_eq!(count, 5);
        }
    }
}
