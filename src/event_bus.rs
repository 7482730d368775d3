//! Event bus for workflow observability.
//!
//! Nodes and the runner emit structured [`Event`]s over a flume channel; a
//! background listener task fans them out to one or more [`EventSink`]s.
//! Sinks cover the common consumption patterns: stdout for interactive runs,
//! an in-memory buffer for tests, and a channel sink for streaming to async
//! consumers.

use std::fmt;
use std::io::{self, Result as IoResult, Stdout, Write};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{sync::oneshot, task};

/// A structured observability event flowing through the bus.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    /// Emitted from within a node via [`NodeContext::emit`](crate::node::NodeContext::emit).
    Node(NodeEvent),
    /// Emitted by the runtime itself (barrier results, routing decisions).
    Diagnostic(DiagnosticEvent),
}

impl Event {
    /// Node event without execution metadata.
    pub fn node_message(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Event::Node(NodeEvent::new(None, None, scope.into(), message.into()))
    }

    /// Node event carrying the emitting node's identity and step.
    pub fn node_message_with_meta(
        node_id: impl Into<String>,
        step: u64,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Event::Node(NodeEvent::new(
            Some(node_id.into()),
            Some(step),
            scope.into(),
            message.into(),
        ))
    }

    /// Runtime diagnostic event.
    pub fn diagnostic(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Event::Diagnostic(DiagnosticEvent {
            scope: scope.into(),
            message: message.into(),
            timestamp: Utc::now(),
        })
    }

    /// Scope label for filtering.
    #[must_use]
    pub fn scope_label(&self) -> &str {
        match self {
            Event::Node(node) => node.scope(),
            Event::Diagnostic(diag) => diag.scope(),
        }
    }

    /// Human-readable payload.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Event::Node(node) => node.message(),
            Event::Diagnostic(diag) => diag.message(),
        }
    }

    /// Convert the event to a normalized JSON object.
    ///
    /// # Example
    ///
    /// ```
    /// use factloom::event_bus::Event;
    ///
    /// let event = Event::node_message_with_meta("writer", 4, "draft", "drafting article");
    /// let json = event.to_json_value();
    /// assert_eq!(json["type"], "node");
    /// assert_eq!(json["metadata"]["node_id"], "writer");
    /// assert_eq!(json["metadata"]["step"], 4);
    /// ```
    pub fn to_json_value(&self) -> serde_json::Value {
        let (event_type, timestamp, metadata) = match self {
            Event::Node(node) => {
                let mut meta = serde_json::Map::new();
                if let Some(node_id) = node.node_id() {
                    meta.insert("node_id".to_string(), json!(node_id));
                }
                if let Some(step) = node.step() {
                    meta.insert("step".to_string(), json!(step));
                }
                ("node", node.timestamp(), serde_json::Value::Object(meta))
            }
            Event::Diagnostic(diag) => (
                "diagnostic",
                diag.timestamp(),
                serde_json::Value::Object(serde_json::Map::new()),
            ),
        };

        json!({
            "type": event_type,
            "scope": self.scope_label(),
            "message": self.message(),
            "timestamp": timestamp.to_rfc3339(),
            "metadata": metadata,
        })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Node(node) => match (node.node_id(), node.step()) {
                (Some(id), Some(step)) => write!(f, "[{id}@{step}] {}", node.message()),
                (Some(id), None) => write!(f, "[{id}] {}", node.message()),
                (None, Some(step)) => write!(f, "[step {step}] {}", node.message()),
                (None, None) => write!(f, "{}", node.message()),
            },
            Event::Diagnostic(diag) => write!(f, "{}: {}", diag.scope(), diag.message()),
        }
    }
}

/// Event emitted from node execution.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeEvent {
    node_id: Option<String>,
    step: Option<u64>,
    scope: String,
    message: String,
    timestamp: DateTime<Utc>,
}

impl NodeEvent {
    pub fn new(node_id: Option<String>, step: Option<u64>, scope: String, message: String) -> Self {
        Self {
            node_id,
            step,
            scope,
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    pub fn step(&self) -> Option<u64> {
        self.step
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event emitted by the runtime.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticEvent {
    scope: String,
    message: String,
    timestamp: DateTime<Utc>,
}

impl DiagnosticEvent {
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Abstraction over an output target that consumes full Event objects.
pub trait EventSink: Sync + Send {
    /// Handle a structured event. The sink decides how to format it.
    fn handle(&mut self, event: &Event) -> IoResult<()>;
}

/// Stdout sink using the event's `Display` rendering.
pub struct StdOutSink {
    handle: Stdout,
}

impl Default for StdOutSink {
    fn default() -> Self {
        Self {
            handle: io::stdout(),
        }
    }
}

impl EventSink for StdOutSink {
    fn handle(&mut self, event: &Event) -> IoResult<()> {
        writeln!(self.handle, "{event}")?;
        self.handle.flush()
    }
}

/// In-memory sink for testing and snapshots.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<Event>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all captured events.
    pub fn snapshot(&self) -> Vec<Event> {
        self.entries.lock().unwrap().clone()
    }

    /// Clear all captured events.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl EventSink for MemorySink {
    fn handle(&mut self, event: &Event) -> IoResult<()> {
        self.entries.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Channel-based sink for streaming to async consumers.
pub struct ChannelSink {
    tx: flume::Sender<Event>,
}

impl ChannelSink {
    pub fn new(tx: flume::Sender<Event>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn handle(&mut self, event: &Event) -> IoResult<()> {
        self.tx
            .send(event.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "channel receiver dropped"))
    }
}

/// EventBus receives events from producers and broadcasts them to sinks.
pub struct EventBus {
    sinks: Arc<Mutex<Vec<Box<dyn EventSink>>>>,
    event_channel: (flume::Sender<Event>, flume::Receiver<Event>),
    listener: Arc<Mutex<Option<ListenerState>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_sink(StdOutSink::default())
    }
}

impl EventBus {
    /// Create an EventBus with a single sink.
    pub fn with_sink<T>(sink: T) -> Self
    where
        T: EventSink + 'static,
    {
        Self {
            sinks: Arc::new(Mutex::new(vec![Box::new(sink)])),
            event_channel: flume::unbounded(),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    /// Create an EventBus with multiple sinks.
    pub fn with_sinks(sinks: Vec<Box<dyn EventSink>>) -> Self {
        Self {
            sinks: Arc::new(Mutex::new(sinks)),
            event_channel: flume::unbounded(),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    /// Dynamically add a sink (useful for per-run streaming).
    pub fn add_sink<T: EventSink + 'static>(&self, sink: T) {
        self.sinks.lock().unwrap().push(Box::new(sink));
    }

    /// Get a clone of the sender side so producers can emit events.
    pub fn get_sender(&self) -> flume::Sender<Event> {
        self.event_channel.0.clone()
    }

    /// Spawn a background task that fans incoming events out to every sink.
    /// Idempotent: a second call while a listener is running does nothing.
    pub fn listen_for_events(&self) {
        let mut slot = self.listener.lock().expect("listener poisoned");
        if slot.is_some() {
            return;
        }

        let receiver = self.event_channel.1.clone();
        let sinks = self.sinks.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = task::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    recv = receiver.recv_async() => match recv {
                        Ok(event) => fan_out(&sinks, &event),
                        // All senders gone; nothing left to deliver.
                        Err(_) => return,
                    },
                }
            }
            // Shutdown requested: flush whatever is still queued.
            while let Ok(event) = receiver.try_recv() {
                fan_out(&sinks, &event);
            }
        });

        *slot = Some((shutdown_tx, handle));
    }

    /// Stop the background listener task, waiting for queued events to be
    /// delivered first.
    pub async fn stop_listener(&self) {
        let taken = self.listener.lock().expect("listener poisoned").take();
        if let Some((shutdown_tx, handle)) = taken {
            let _ = shutdown_tx.send(());
            let _ = handle.await;
        }
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        // No runtime to await on here; signal and detach.
        if let Ok(mut slot) = self.listener.lock()
            && let Some((shutdown_tx, handle)) = slot.take()
        {
            let _ = shutdown_tx.send(());
            handle.abort();
        }
    }
}

type ListenerState = (oneshot::Sender<()>, task::JoinHandle<()>);

fn fan_out(sinks: &Arc<Mutex<Vec<Box<dyn EventSink>>>>, event: &Event) {
    let mut sinks = sinks.lock().expect("sinks poisoned");
    for sink in sinks.iter_mut() {
        if let Err(err) = sink.handle(event) {
            tracing::warn!(%err, "event sink rejected event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = Event::diagnostic("barrier", "merged 2 channels");
        let json = event.to_json_value();
        assert_eq!(json["type"], "diagnostic");
        assert_eq!(json["scope"], "barrier");
        assert_eq!(json["message"], "merged 2 channels");
    }

    #[test]
    fn test_display_with_meta() {
        let event = Event::node_message_with_meta("writer", 3, "draft", "working");
        assert_eq!(event.to_string(), "[writer@3] working");
    }

    #[tokio::test]
    async fn test_bus_delivers_to_memory_sink() {
        let sink = MemorySink::new();
        let bus = EventBus::with_sink(sink.clone());
        bus.listen_for_events();

        let sender = bus.get_sender();
        sender.send(Event::node_message("scope", "one")).unwrap();
        sender.send(Event::diagnostic("scope", "two")).unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        bus.stop_listener().await;

        let events = sink.snapshot();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message(), "one");
        assert_eq!(events[1].message(), "two");
    }
}
