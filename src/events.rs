/*!
 * Typed events delivered to the slicer controller.
 *
 * Pin changes and document-changed notifications share one ordered channel,
 * so the controller sees them in the order they were raised.
 */

use std::path::PathBuf;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::mpsc::error::SendError;

use crate::pins::{PinSignal, PinValue};

/// Event handled by the controller's dispatch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlicerEvent {
    /// The `enable` pin changed
    EnableChanged(bool),
    /// The `layer.in` pin changed
    LayerIndexChanged(i32),
    /// A drawing should be (re)loaded from this path
    DocumentChanged(PathBuf),
    /// Stop the dispatch loop
    Shutdown,
}

impl SlicerEvent {
    /// Event raised by an external write to `signal`, if the signal is an input
    pub fn from_pin(signal: PinSignal, value: PinValue) -> Option<Self> {
        match (signal, value) {
            (PinSignal::Enable, PinValue::Bit(enabled)) => Some(Self::EnableChanged(enabled)),
            (PinSignal::LayerIn, PinValue::S32(index)) => Some(Self::LayerIndexChanged(index)),
            _ => None,
        }
    }
}

/// Receiving end of the controller channel
pub type EventReceiver = UnboundedReceiver<SlicerEvent>;

/// Sending end of the controller channel
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: UnboundedSender<SlicerEvent>,
}

impl EventSender {
    pub fn send(&self, event: SlicerEvent) -> Result<(), SendError<SlicerEvent>> {
        self.inner.send(event)
    }

    /// Handle for the file-management collaborator
    pub fn notifier(&self) -> DocumentNotifier {
        DocumentNotifier { sender: self.clone() }
    }
}

/// Handle used to announce that a drawing file has changed
///
/// Every notification means "replace the document and reset the selection",
/// even when the path is the same as the one already loaded.
#[derive(Debug, Clone)]
pub struct DocumentNotifier {
    sender: EventSender,
}

impl DocumentNotifier {
    pub fn notify(&self, path: impl Into<PathBuf>) -> Result<(), SendError<SlicerEvent>> {
        self.sender.send(SlicerEvent::DocumentChanged(path.into()))
    }
}

/// Create the controller channel
pub fn slicer_channel() -> (EventSender, EventReceiver) {
    let (inner, receiver) = mpsc::unbounded_channel();
    (EventSender { inner }, receiver)
}
