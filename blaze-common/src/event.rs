//! Events emitted by a node session.
pub mod node;
pub mod session;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::chan;
use crate::event::node::NodeEvent;
use crate::event::session::SessionEvent;

type Subscribers<T> = Arc<Mutex<Vec<chan::Sender<T>>>>;

fn lock<T>(subscribers: &Subscribers<T>) -> MutexGuard<'_, Vec<chan::Sender<T>>> {
    // a panic inside a subscriber push leaves the vector usable
    subscribers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Publishes events to subscribers.
///
/// Publishing never blocks: every subscriber owns an unbounded queue,
/// so a slow reader only grows its own backlog.
#[derive(Clone)]
pub struct Emitter<T> {
    subscribers: Subscribers<T>,
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self {
            subscribers: Default::default(),
        }
    }
}

impl<T: Clone> Emitter<T> {
    /// Emit an event to all subscribers, forgetting the ones whose
    /// receiver was dropped.
    pub fn emit(&self, event: T) {
        lock(&self.subscribers).retain(|sender| sender.try_send(event.clone()).is_ok());
    }

    /// Number of subscribers still listening.
    pub fn listeners(&self) -> usize {
        lock(&self.subscribers).len()
    }

    /// Create a subscriber from this emitter.
    pub fn subscriber(&self) -> Subscriber<T> {
        Subscriber {
            subscribers: self.subscribers.clone(),
        }
    }
}

/// Subscribes to events.
#[derive(Clone)]
pub struct Subscriber<T> {
    subscribers: Subscribers<T>,
}

impl<T: Clone> Subscriber<T> {
    /// Add a subscription to receive broadcast events.
    pub fn subscribe(&self) -> chan::Receiver<T> {
        let (sender, receiver) = chan::unbounded();
        lock(&self.subscribers).push(sender);
        receiver
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "event", rename_all = "lowercase")]
pub enum Event {
    /// Event coming from the backend node.
    Node(NodeEvent),
    /// Change of the session lifecycle.
    Session(SessionEvent),
}
