//! Reply capture and correlation.
//!
//! Sending a capture-capable command registers a [`PendingCapture`] run:
//! every subsequent inbound message is offered to each open capture in
//! registration order, accumulated when the command family's
//! `is_response` predicate accepts it, and delivered to the waiting
//! caller once `ends_response` declares the exchange complete.
//!
//! All state lives behind one mutex; offers, registration, and removal
//! are brief and O(open captures). Captures never interfere with one
//! another: an accepted message is cloned into the capture, and the
//! original continues to every other open capture and to the event
//! router. A capture left open when the connection drops is failed with
//! [`CaptureError::Disconnected`] rather than left hanging, and dropping
//! a [`CaptureHandle`] cancels its capture.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::CaptureError;
use crate::message::Message;
use crate::registry::CaptureSpec;

type Outcome = Result<Vec<Message>, CaptureError>;

struct PendingCapture {
    id: u64,
    origin: Message,
    spec: CaptureSpec,
    replies: Vec<Message>,
    tx: oneshot::Sender<Outcome>,
}

#[derive(Default)]
struct Live {
    captures: Vec<PendingCapture>,
    next_id: u64,
}

/// Matches inbound messages against pending reply captures.
#[derive(Clone, Default)]
pub struct ReplyCorrelator {
    live: Arc<Mutex<Live>>,
}

impl ReplyCorrelator {
    /// Create an empty correlator.
    pub fn new() -> ReplyCorrelator {
        ReplyCorrelator::default()
    }

    /// Register a capture for a message about to be sent.
    ///
    /// Fails with [`CaptureError::Unsupported`] when the message's
    /// command has no reply predicates. The returned handle resolves
    /// once the exchange completes, the connection drops, or the handle
    /// is cancelled.
    pub fn begin_capture(&self, origin: &Message) -> Result<CaptureHandle, CaptureError> {
        let spec = origin
            .descriptor()
            .capture
            .ok_or_else(|| CaptureError::Unsupported {
                command: origin.command().to_string(),
            })?;

        let (tx, rx) = oneshot::channel();
        let mut live = self.live.lock();
        let id = live.next_id;
        live.next_id += 1;
        live.captures.push(PendingCapture {
            id,
            origin: origin.clone(),
            spec,
            replies: Vec::new(),
            tx,
        });
        debug!(command = origin.command(), id, "capture opened");

        Ok(CaptureHandle {
            id,
            rx,
            live: Arc::clone(&self.live),
        })
    }

    /// Offer an inbound message to every open capture, in registration
    /// order. Returns how many captures accepted it.
    pub fn offer(&self, msg: &Message) -> usize {
        let mut live = self.live.lock();
        let mut accepted = 0;
        let mut i = 0;
        while i < live.captures.len() {
            let capture = &mut live.captures[i];
            if (capture.spec.is_response)(&capture.origin, msg) {
                accepted += 1;
                capture.replies.push(msg.clone());
                if (capture.spec.ends_response)(&capture.origin, msg) {
                    let capture = live.captures.remove(i);
                    debug!(
                        command = capture.origin.command(),
                        id = capture.id,
                        replies = capture.replies.len(),
                        "capture completed"
                    );
                    let _ = capture.tx.send(Ok(capture.replies));
                    continue;
                }
            }
            i += 1;
        }
        accepted
    }

    /// Fail every open capture with [`CaptureError::Disconnected`] and
    /// clear the live set.
    pub fn disconnect_all(&self) {
        let captures = std::mem::take(&mut self.live.lock().captures);
        for capture in captures {
            debug!(
                command = capture.origin.command(),
                id = capture.id,
                "capture cancelled by disconnect"
            );
            let _ = capture.tx.send(Err(CaptureError::Disconnected));
        }
    }

    /// Number of currently open captures.
    pub fn open_count(&self) -> usize {
        self.live.lock().captures.len()
    }
}

/// A pending exchange: await it to receive the accumulated replies.
pub struct CaptureHandle {
    id: u64,
    rx: oneshot::Receiver<Outcome>,
    live: Arc<Mutex<Live>>,
}

impl std::fmt::Debug for CaptureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureHandle").field("id", &self.id).finish()
    }
}

impl CaptureHandle {
    /// Wait until the exchange completes or the connection drops.
    pub async fn wait(mut self) -> Outcome {
        match (&mut self.rx).await {
            Ok(outcome) => outcome,
            // Sender gone without a verdict: the correlator was dropped.
            Err(_) => Err(CaptureError::Disconnected),
        }
    }

    /// Wait, giving up after `timeout`. An elapsed deadline cancels the
    /// capture and yields [`CaptureError::TimedOut`].
    pub async fn wait_timeout(mut self, timeout: Duration) -> Outcome {
        match tokio::time::timeout(timeout, &mut self.rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(CaptureError::Disconnected),
            Err(_) => Err(CaptureError::TimedOut),
        }
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        let mut live = self.live.lock();
        if let Some(at) = live.captures.iter().position(|c| c.id == self.id) {
            let capture = live.captures.remove(at);
            debug!(
                command = capture.origin.command(),
                id = capture.id,
                "capture cancelled"
            );
        }
    }
}
