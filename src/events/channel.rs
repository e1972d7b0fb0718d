//! Unbounded crossbeam channel carrying run events to one listener.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Handle the pipeline emits through. Clones go to rayon hashing workers.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Emit an event. With no listener left the event is dropped.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Listening end, held by the CLI's progress thread or by a test.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Events in emission order; ends once the run drops its sender
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

pub struct EventChannel;

impl EventChannel {
    /// Open a channel for one run.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (inner, receiver) = unbounded();
        (EventSender { inner }, EventReceiver { inner: receiver })
    }
}

/// Sender for `Pipeline::run`, where nobody listens.
pub fn null_sender() -> EventSender {
    EventChannel::new().0
}
