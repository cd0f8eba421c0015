//! Event routing: fan parsed messages out to application handlers.
//!
//! Handlers are keyed by uppercase command name and invoked synchronously
//! in registration order on the task that received the line. A panicking
//! handler is isolated and logged; the remaining handlers still run.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::error;

use crate::message::Message;

/// Identifies a registered handler for later removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Arc<dyn Fn(&Message) + Send + Sync>;

#[derive(Default)]
struct Table {
    handlers: HashMap<String, Vec<(HandlerId, Handler)>>,
    next_id: u64,
}

/// Command-keyed pub-sub for inbound messages.
#[derive(Default)]
pub struct EventRouter {
    table: Mutex<Table>,
}

impl EventRouter {
    /// Create an empty router.
    pub fn new() -> EventRouter {
        EventRouter::default()
    }

    /// Register a handler for a command. Returns an id usable with
    /// [`EventRouter::off`].
    pub fn on<F>(&self, command: &str, handler: F) -> HandlerId
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        let mut table = self.table.lock();
        let id = HandlerId(table.next_id);
        table.next_id += 1;
        table
            .handlers
            .entry(command.to_ascii_uppercase())
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a previously registered handler. Returns whether it was
    /// still registered.
    pub fn off(&self, id: HandlerId) -> bool {
        let mut table = self.table.lock();
        for handlers in table.handlers.values_mut() {
            if let Some(at) = handlers.iter().position(|(hid, _)| *hid == id) {
                handlers.remove(at);
                return true;
            }
        }
        false
    }

    /// Dispatch a message to its command's handlers, in registration
    /// order. Returns how many handlers ran.
    pub fn dispatch(&self, msg: &Message) -> usize {
        let handlers: Vec<Handler> = {
            let table = self.table.lock();
            match table.handlers.get(msg.command()) {
                Some(handlers) => handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return 0,
            }
        };

        let mut ran = 0;
        for handler in handlers {
            ran += 1;
            if catch_unwind(AssertUnwindSafe(|| handler(msg))).is_err() {
                error!(command = msg.command(), "message handler panicked");
            }
        }
        ran
    }
}
