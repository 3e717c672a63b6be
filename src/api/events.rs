//! Event delivery to the host application
//!
//! The original SDK marshaled all delegate callbacks onto the main dispatch
//! queue. The Rust rendition hands the host a single-consumer
//! [`Subscription`] instead: events arrive strictly in occurrence order and
//! the host drains them on whichever thread it designates.

use crate::api::error::PositioningError;
use crate::core::{Heading, Location};
use log::debug;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// An asynchronous notification from the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    HeadingUpdate(Heading),
    LocationUpdate(Location),
    Failure {
        error: PositioningError,
        timestamp_ms: u64,
    },
    Log {
        message: String,
        timestamp_ms: u64,
    },
}

impl Event {
    /// A failure event stamped with the current time.
    pub fn failure(error: PositioningError) -> Self {
        Event::Failure {
            error,
            timestamp_ms: epoch_ms(),
        }
    }

    /// A diagnostic log event stamped with the current time.
    pub fn log(message: impl Into<String>) -> Self {
        Event::Log {
            message: message.into(),
            timestamp_ms: epoch_ms(),
        }
    }

    /// Event type tag matching the original wrapper callbacks.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::HeadingUpdate(_) => "didReceiveHeading",
            Event::LocationUpdate(_) => "didReceiveLocation",
            Event::Failure { .. } => "didReceiveError",
            Event::Log { .. } => "didReceiveLog",
        }
    }

    /// JSON envelope as produced by the original Cordova wrappers:
    /// `{"eventType": ..., "event": ...}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Event::HeadingUpdate(heading) => serde_json::json!({
                "eventType": self.kind(),
                "event": heading,
            }),
            Event::LocationUpdate(location) => serde_json::json!({
                "eventType": self.kind(),
                "event": location,
            }),
            Event::Failure {
                error,
                timestamp_ms,
            } => serde_json::json!({
                "eventType": self.kind(),
                "event": {
                    "errorCode": error.code(),
                    "errorMessage": error.to_string(),
                    "timestamp": timestamp_ms,
                },
            }),
            Event::Log {
                message,
                timestamp_ms,
            } => serde_json::json!({
                "eventType": self.kind(),
                "event": {
                    "message": message,
                    "timestamp": timestamp_ms,
                },
            }),
        }
    }
}

/// Consumer endpoint for controller events.
///
/// Dropping the subscription silently stops delivery; it never keeps a
/// session alive.
pub struct Subscription {
    receiver: Receiver<Event>,
}

impl Subscription {
    /// Fetch the next event without blocking.
    pub fn try_next(&self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_timeout(&self, timeout: Duration) -> Option<Event> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain every event currently queued, in order.
    pub fn drain(&self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(event) = self.try_next() {
            events.push(event);
        }
        events
    }
}

/// Producer side shared between the controller and its session worker.
///
/// Holds at most one live sender; subscribing again replaces it, and a
/// dropped subscription is detected on the next emit and cleared.
#[derive(Clone, Default)]
pub(crate) struct EventSink {
    sender: Arc<Mutex<Option<Sender<Event>>>>,
}

impl EventSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        let mut slot = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(sender);
        Subscription { receiver }
    }

    pub(crate) fn emit(&self, event: Event) {
        let mut slot = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = slot.as_ref() {
            if sender.send(event).is_err() {
                debug!("subscription dropped, clearing event sender");
                *slot = None;
            }
        }
    }
}
