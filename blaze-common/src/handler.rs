use crate::chan;
use crate::event::Event;

/// Anything that publishes session events to listeners.
pub trait Handler: Send + Sync {
    /// Register a new listener, every call returns an independent queue.
    fn events(&self) -> chan::Receiver<Event>;
    fn emit(&self, event: Event);
}
