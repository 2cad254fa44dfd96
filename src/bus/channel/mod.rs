//! In-memory channel-based broker for standalone mode.
//!
//! Routes through the same topology and topic rules as RabbitMQ. A queue
//! only buffers once `consume` has claimed it; deliveries to unclaimed
//! queues are dropped, so a single process never accumulates messages meant
//! for services that are not running.
//!
//! Brokers built with `with_history` also keep the most recent publishes and
//! ack/nack outcomes, which is what the scenario tests inspect.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify, RwLock};
use tracing::{debug, info};

use super::{
    settle, BusError, Delivery, Disposition, MessageBroker, MessageHandler, PublishedMessage,
    Publisher, Result, Topology,
};
use crate::envelope::Envelope;

/// History size used by the scenario tests.
pub const DEFAULT_HISTORY_LIMIT: usize = 1024;

/// Outcome of one delivery, as applied by the consumer loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub queue: String,
    pub routing_key: String,
    pub disposition: Disposition,
}

/// Ring buffers of recent publishes and settlements. A limit of 0 records
/// nothing.
struct History {
    limit: usize,
    published: RwLock<VecDeque<PublishedMessage>>,
    settlements: RwLock<VecDeque<Settlement>>,
}

impl History {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            published: RwLock::new(VecDeque::new()),
            settlements: RwLock::new(VecDeque::new()),
        }
    }

    async fn record_publish(&self, message: PublishedMessage) {
        push_bounded(&mut *self.published.write().await, message, self.limit);
    }

    async fn record_settlement(&self, settlement: Settlement) {
        push_bounded(&mut *self.settlements.write().await, settlement, self.limit);
    }
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, item: T, limit: usize) {
    if limit == 0 {
        return;
    }
    while buffer.len() >= limit {
        buffer.pop_front();
    }
    buffer.push_back(item);
}

/// In-process broker using tokio channels.
pub struct ChannelBroker {
    topology: Topology,
    /// Senders for queues claimed by `consume`. Cleared on close, which ends
    /// the consumers.
    senders: RwLock<HashMap<String, mpsc::UnboundedSender<Arc<Delivery>>>>,
    history: Arc<History>,
    settled_count: Arc<AtomicUsize>,
    settled: Arc<Notify>,
    failing_keys: RwLock<HashSet<String>>,
    closed: AtomicBool,
}

impl ChannelBroker {
    /// Create a broker for `topology` that keeps no history.
    pub fn new(topology: Topology) -> Self {
        Self::build(topology, 0)
    }

    /// Create a broker that remembers the last `limit` publishes and
    /// settlements.
    pub fn with_history(topology: Topology, limit: usize) -> Self {
        Self::build(topology, limit)
    }

    fn build(topology: Topology, history_limit: usize) -> Self {
        info!(
            exchange = %topology.exchange,
            queues = topology.queues.len(),
            history_limit,
            "Channel broker initialized"
        );

        Self {
            topology,
            senders: RwLock::new(HashMap::new()),
            history: Arc::new(History::new(history_limit)),
            settled_count: Arc::new(AtomicUsize::new(0)),
            settled: Arc::new(Notify::new()),
            failing_keys: RwLock::new(HashSet::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Make every later publish with `routing_key` fail.
    pub async fn fail_publish_on(&self, routing_key: impl Into<String>) {
        self.failing_keys.write().await.insert(routing_key.into());
    }

    /// Undo `fail_publish_on`.
    pub async fn clear_publish_failures(&self) {
        self.failing_keys.write().await.clear();
    }

    /// Deliver raw bytes as if a peer had published them.
    ///
    /// Bypasses envelope encoding, so malformed bodies can be injected.
    pub async fn publish_raw(&self, routing_key: &str, body: Vec<u8>) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BusError::Closed);
        }
        self.route(routing_key, body).await;
        Ok(())
    }

    /// Recorded `publish` calls, oldest first.
    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.history.published.read().await.iter().cloned().collect()
    }

    /// Recorded publishes with `routing_key`.
    pub async fn published_to(&self, routing_key: &str) -> Vec<PublishedMessage> {
        self.history
            .published
            .read()
            .await
            .iter()
            .filter(|m| m.routing_key == routing_key)
            .cloned()
            .collect()
    }

    /// Recorded acks and nacks, oldest first.
    pub async fn settlements(&self) -> Vec<Settlement> {
        self.history.settlements.read().await.iter().cloned().collect()
    }

    /// Deliveries settled since the broker was created.
    pub fn settled_count(&self) -> usize {
        self.settled_count.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` deliveries have been settled or `timeout`
    /// elapses, then return the recorded settlements.
    pub async fn wait_for_settlements(&self, count: usize, timeout: Duration) -> Vec<Settlement> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.settled.notified();
            if self.settled_count() >= count {
                return self.settlements().await;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.settlements().await;
            }
        }
    }

    async fn route(&self, routing_key: &str, body: Vec<u8>) {
        let delivery = Arc::new(Delivery::new(routing_key, body));
        let senders = self.senders.read().await;

        let mut routed = 0;
        for queue in self.topology.queues_for(routing_key) {
            match senders.get(&queue.name) {
                Some(tx) => {
                    if tx.send(Arc::clone(&delivery)).is_ok() {
                        routed += 1;
                    }
                }
                None => {
                    debug!(
                        queue = %queue.name,
                        routing_key = %routing_key,
                        "No consumer on queue, message dropped"
                    );
                }
            }
        }

        if routed == 0 {
            debug!(routing_key = %routing_key, "Message reached no consumer");
        } else {
            debug!(routing_key = %routing_key, queues = routed, "Routed message");
        }
    }
}

#[async_trait]
impl Publisher for ChannelBroker {
    async fn publish(&self, routing_key: &str, envelope: &Envelope) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BusError::Closed);
        }
        if self.failing_keys.read().await.contains(routing_key) {
            return Err(BusError::Publish(format!(
                "Channel publish to '{}' rejected",
                routing_key
            )));
        }

        let body = envelope.to_vec()?;
        self.history
            .record_publish(PublishedMessage {
                routing_key: routing_key.to_string(),
                envelope: envelope.clone(),
            })
            .await;
        self.route(routing_key, body).await;
        Ok(())
    }
}

#[async_trait]
impl MessageBroker for ChannelBroker {
    async fn consume(&self, queue: &str, handler: Arc<dyn MessageHandler>) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BusError::Closed);
        }
        if self.topology.queue(queue).is_none() {
            return Err(BusError::Subscribe(format!("Queue '{}' is not declared", queue)));
        }

        let mut receiver = {
            let mut senders = self.senders.write().await;
            if senders.contains_key(queue) {
                return Err(BusError::Subscribe(format!(
                    "Queue '{}' already has a consumer",
                    queue
                )));
            }
            let (tx, rx) = mpsc::unbounded_channel();
            senders.insert(queue.to_string(), tx);
            rx
        };

        let queue_name = queue.to_string();
        let history = Arc::clone(&self.history);
        let settled_count = Arc::clone(&self.settled_count);
        let settled = Arc::clone(&self.settled);

        tokio::spawn(async move {
            while let Some(delivery) = receiver.recv().await {
                let routing_key = delivery.routing_key.clone();
                let disposition = settle(handler.as_ref(), delivery).await;

                history
                    .record_settlement(Settlement {
                        queue: queue_name.clone(),
                        routing_key,
                        disposition,
                    })
                    .await;
                settled_count.fetch_add(1, Ordering::SeqCst);
                settled.notify_waiters();
            }
            info!(queue = %queue_name, "Channel closed, stopping consumer");
        });

        info!(queue = %queue, "Channel consumer started");
        Ok(())
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            debug!("Channel broker already closed");
            return;
        }
        self.senders.write().await.clear();
        info!("Channel broker closed");
    }
}
