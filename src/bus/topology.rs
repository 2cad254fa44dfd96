//! Broker topology shared by every service that talks about trips.
//!
//! All traffic goes through one durable topic exchange. Queues are durable
//! and bound by exact routing keys; `topic_matches` implements the AMQP
//! topic rules so the in-process broker routes the same way RabbitMQ does.

/// Exchange name for trip traffic.
pub const DEFAULT_EXCHANGE: &str = "trip";

/// Driver accepted a trip offer.
pub const DRIVER_CMD_TRIP_ACCEPT: &str = "driver.cmd.trip_accept";
/// Driver declined a trip offer.
pub const DRIVER_CMD_TRIP_DECLINE: &str = "driver.cmd.trip_decline";
/// A driver was assigned to the rider's trip.
pub const TRIP_EVENT_DRIVER_ASSIGNED: &str = "trip.event.driver_assigned";
/// The offered driver is not interested in the rider's trip.
pub const TRIP_EVENT_DRIVER_NOT_INTERESTED: &str = "trip.event.driver_not_interested";
/// Ask the payment service to open a checkout session.
pub const PAYMENT_CMD_CREATE_SESSION: &str = "payment.cmd.create_session";

/// Driver decisions consumed by the trip service.
pub const DRIVER_TRIP_RESPONSE_QUEUE: &str = "driver_trip_response";
/// Driver-assigned notifications for the gateway.
pub const NOTIFY_DRIVER_ASSIGNMENT_QUEUE: &str = "notify_driver_assignment";
/// Driver-not-interested notifications for the gateway.
pub const NOTIFY_DRIVER_NOT_INTERESTED_QUEUE: &str = "notify_driver_not_interested";
/// Payment session commands for the payment service.
pub const PAYMENT_TRIP_RESPONSE_QUEUE: &str = "payment_trip_response";

/// A durable queue and the routing patterns bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSpec {
    pub name: String,
    pub bindings: Vec<String>,
}

impl QueueSpec {
    pub fn new(name: impl Into<String>, bindings: &[&str]) -> Self {
        Self {
            name: name.into(),
            bindings: bindings.iter().map(|b| b.to_string()).collect(),
        }
    }

    /// Whether a message published with `routing_key` lands in this queue.
    pub fn accepts(&self, routing_key: &str) -> bool {
        self.bindings.iter().any(|b| topic_matches(b, routing_key))
    }
}

/// Exchange plus queues to declare at connect time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub exchange: String,
    pub queues: Vec<QueueSpec>,
}

impl Topology {
    pub fn new(exchange: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            queues: Vec::new(),
        }
    }

    /// Add a queue bound to `bindings`.
    pub fn with_queue(mut self, name: impl Into<String>, bindings: &[&str]) -> Self {
        self.queues.push(QueueSpec::new(name, bindings));
        self
    }

    /// Queues the trip service consumes and the ones it publishes into.
    ///
    /// Outbound queues are declared too, so messages published before the
    /// downstream consumer starts are kept.
    pub fn trip_service(exchange: impl Into<String>) -> Self {
        Self::new(exchange)
            .with_queue(
                DRIVER_TRIP_RESPONSE_QUEUE,
                &[DRIVER_CMD_TRIP_ACCEPT, DRIVER_CMD_TRIP_DECLINE],
            )
            .with_queue(NOTIFY_DRIVER_ASSIGNMENT_QUEUE, &[TRIP_EVENT_DRIVER_ASSIGNED])
            .with_queue(
                NOTIFY_DRIVER_NOT_INTERESTED_QUEUE,
                &[TRIP_EVENT_DRIVER_NOT_INTERESTED],
            )
            .with_queue(PAYMENT_TRIP_RESPONSE_QUEUE, &[PAYMENT_CMD_CREATE_SESSION])
    }

    pub fn queue(&self, name: &str) -> Option<&QueueSpec> {
        self.queues.iter().find(|q| q.name == name)
    }

    /// Queues a message with `routing_key` is delivered to.
    pub fn queues_for<'a>(&'a self, routing_key: &'a str) -> impl Iterator<Item = &'a QueueSpec> {
        self.queues.iter().filter(move |q| q.accepts(routing_key))
    }
}

/// AMQP topic matching: words are dot-separated, `*` matches exactly one
/// word, `#` matches zero or more words.
pub fn topic_matches(pattern: &str, routing_key: &str) -> bool {
    let pattern: Vec<&str> = pattern.split('.').collect();
    let key: Vec<&str> = routing_key.split('.').collect();
    words_match(&pattern, &key)
}

fn words_match(pattern: &[&str], key: &[&str]) -> bool {
    match (pattern.split_first(), key.split_first()) {
        (None, None) => true,
        (Some((&"#", rest)), _) => {
            words_match(rest, key) || (!key.is_empty() && words_match(pattern, &key[1..]))
        }
        (Some((&"*", rest)), Some((_, key_rest))) => words_match(rest, key_rest),
        (Some((word, rest)), Some((key_word, key_rest))) => {
            word == key_word && words_match(rest, key_rest)
        }
        _ => false,
    }
}
