//! Change notifications.
//!
//! Producers fire signals without waiting; any number of consumers
//! (code lens refresh, client notifications, tests) subscribe.

use log::trace;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// A fire-and-forget signal carrying no payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeSignal {
    /// The persisted range set changed.
    RangesChanged,
    /// The document the user is looking at changed.
    ActiveDocumentChanged,
}

/// Publish side of the change signals. Cloning shares the channel.
#[derive(Clone, Debug)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeSignal>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeSignal> {
        self.sender.subscribe()
    }

    pub fn ranges_changed(&self) {
        self.send(ChangeSignal::RangesChanged);
    }

    pub fn active_document_changed(&self) {
        self.send(ChangeSignal::ActiveDocumentChanged);
    }

    fn send(&self, signal: ChangeSignal) {
        // No subscribers is fine.
        if self.sender.send(signal).is_err() {
            trace!(target: "nvtx_ranges::notify", "No subscriber for {:?}", signal);
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
