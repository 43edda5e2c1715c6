//! # Event Bus System
//!
//! Typed notifications from the photo library to whoever renders it, carried
//! over `tokio::sync::broadcast`.
//!
//! ```text
//! ┌────────────────┐   emit   ┌───────────┐  subscribe  ┌────────────────┐
//! │ LibraryManager ├─────────>│ EventBus  ├────────────>│ UI / telemetry │
//! └────────────────┘          └───────────┘             └────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Library(LibraryEvent::PhotoAdded {
//!     filename: "1700000000000.jpeg".to_string(),
//! }))
//! .ok();
//!
//! assert!(matches!(rx.recv().await, Ok(CoreEvent::Library(_))));
//! # }
//! ```
//!
//! Emitting with no subscribers returns an error; publishers treat that as
//! "nobody listening" and move on. Slow subscribers see `RecvError::Lagged`
//! and can keep receiving. `RecvError::Closed` means the bus was dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Library(LibraryEvent),
    Capture(CaptureEvent),
}

impl CoreEvent {
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Library(e) => e.description(),
            CoreEvent::Capture(e) => e.description(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Library(LibraryEvent::OrphanLeft { .. }) => EventSeverity::Warning,
            CoreEvent::Library(LibraryEvent::Loaded {
                recovered_from_corruption: true,
                ..
            }) => EventSeverity::Warning,
            CoreEvent::Capture(CaptureEvent::Unavailable { .. }) => EventSeverity::Warning,
            CoreEvent::Library(LibraryEvent::PhotoAdded { .. })
            | CoreEvent::Library(LibraryEvent::PhotoDeleted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Changes to the photo library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    /// The library was (re)loaded from the index.
    Loaded {
        photo_count: usize,
        /// The persisted index was unreadable and the library started empty.
        recovered_from_corruption: bool,
    },
    /// A photo was captured, stored and indexed.
    PhotoAdded { filename: String },
    /// A photo was removed from the index.
    PhotoDeleted { filename: String },
    /// A photo left the index but its bytes could not be deleted.
    OrphanLeft { filename: String, reason: String },
    /// Unreferenced blobs were removed from the store.
    OrphansReclaimed { filenames: Vec<String> },
}

impl LibraryEvent {
    fn description(&self) -> &str {
        match self {
            LibraryEvent::Loaded { .. } => "Library loaded",
            LibraryEvent::PhotoAdded { .. } => "Photo added to library",
            LibraryEvent::PhotoDeleted { .. } => "Photo removed from library",
            LibraryEvent::OrphanLeft { .. } => "Photo bytes left behind after delete",
            LibraryEvent::OrphansReclaimed { .. } => "Orphaned photo bytes reclaimed",
        }
    }
}

/// Capture attempts that ended without a photo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CaptureEvent {
    /// The user dismissed the capture UI.
    Cancelled { message: String },
    /// The host has no capture capability.
    Unavailable { message: String },
}

impl CaptureEvent {
    fn description(&self) -> &str {
        match self {
            CaptureEvent::Cancelled { .. } => "Capture cancelled",
            CaptureEvent::Unavailable { .. } => "Capture unavailable",
        }
    }
}

/// Broadcast channel for [`CoreEvent`]s. Cloning shares the channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event; returns how many subscribers received it.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// New independent receiver. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional filter.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let library_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Library(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned from `recv`/`try_recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Next event passing the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Next buffered event passing the filter, or `None` if nothing is pending.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        use broadcast::error::TryRecvError;

        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Lagged(n)) => return Some(Err(RecvError::Lagged(n))),
                Err(TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
