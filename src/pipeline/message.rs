//! Message bus between stages, the orchestrator and observers.
//!
//! Stages and the orchestrator [`publish`](MessageBus::publish) structured
//! [`Message`]s. Delivery is synchronous, on the calling thread, in
//! subscription order. Nothing is queued or dropped by the bus itself;
//! [`ChannelObserver`] exists for observers that want to consume messages on
//! another thread.

use crate::pipeline::executor::ExecutionResult;
use crossbeam_channel::Sender;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// Identity of whatever emitted a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MessageSource {
    pub class_name: String,
    pub human_label: String,
    /// Position in the pipeline, `None` for the orchestrator itself
    pub pipeline_index: Option<usize>,
}

impl MessageSource {
    pub fn new(class_name: impl Into<String>, human_label: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            human_label: human_label.into(),
            pipeline_index: None,
        }
    }

    pub fn at(mut self, pipeline_index: usize) -> Self {
        self.pipeline_index = Some(pipeline_index);
        self
    }
}

/// A structured message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Error {
        source: MessageSource,
        code: i32,
        text: String,
    },
    Warning {
        source: MessageSource,
        code: i32,
        text: String,
    },
    Status {
        source: MessageSource,
        text: String,
    },
    Progress {
        source: MessageSource,
        percent: i32,
    },
    StandardOutput {
        source: MessageSource,
        text: String,
    },
    /// Last message of an execute pass
    PipelineFinished {
        source: MessageSource,
        result: ExecutionResult,
    },
}

impl Message {
    pub fn source(&self) -> &MessageSource {
        match self {
            Message::Error { source, .. }
            | Message::Warning { source, .. }
            | Message::Status { source, .. }
            | Message::Progress { source, .. }
            | Message::StandardOutput { source, .. }
            | Message::PipelineFinished { source, .. } => source,
        }
    }

    /// Error or warning code, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Message::Error { code, .. } | Message::Warning { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Message::Error { .. })
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Message::Warning { .. })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = &self.source().human_label;
        match self {
            Message::Error { code, text, .. } => write!(f, "[{}] Error ({}): {}", label, code, text),
            Message::Warning { code, text, .. } => {
                write!(f, "[{}] Warning ({}): {}", label, code, text)
            }
            Message::Status { text, .. } => write!(f, "[{}] {}", label, text),
            Message::Progress { percent, .. } => write!(f, "[{}] {}%", label, percent),
            Message::StandardOutput { text, .. } => f.write_str(text),
            Message::PipelineFinished { result, .. } => {
                write!(f, "[{}] Pipeline finished: {:?}", label, result)
            }
        }
    }
}

/// Receives messages from a [`MessageBus`].
#[cfg_attr(test, mockall::automock)]
pub trait Observer: Send + Sync {
    fn process_message(&self, message: &Message);
}

/// Handle returned by [`MessageBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Synchronous fan-out to a list of observers.
#[derive(Default)]
pub struct MessageBus {
    subscribers: Vec<(SubscriptionId, Arc<dyn Observer>)>,
    next_id: u64,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, observer));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn unsubscribe_all(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `message` to every subscriber, in subscription order.
    pub fn publish(&self, message: Message) {
        for (_, observer) in &self.subscribers {
            observer.process_message(&message);
        }
    }
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Forwards every message into `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn process_message(&self, message: &Message) {
        let index = message.source().pipeline_index;
        match message {
            Message::Error { .. } => tracing::error!(?index, "{}", message),
            Message::Warning { .. } => tracing::warn!(?index, "{}", message),
            Message::Status { .. } | Message::StandardOutput { .. } => {
                tracing::info!(?index, "{}", message)
            }
            Message::Progress { .. } => tracing::debug!(?index, "{}", message),
            Message::PipelineFinished { .. } => tracing::info!("{}", message),
        }
    }
}

/// Sends a copy of every message down a crossbeam channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: Sender<Message>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<Message>) -> Self {
        Self { tx }
    }
}

impl Observer for ChannelObserver {
    fn process_message(&self, message: &Message) {
        if self.tx.send(message.clone()).is_err() {
            tracing::trace!("Message receiver dropped");
        }
    }
}

/// Prints status, warnings, errors and stage output to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutObserver {
    /// Also print progress percentages
    pub show_progress: bool,
}

impl Observer for StdoutObserver {
    fn process_message(&self, message: &Message) {
        if matches!(message, Message::Progress { .. }) && !self.show_progress {
            return;
        }
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(out, "{}", message);
    }
}
