//! Tab manager notifications.
//!
//! Events are broadcast on a `tokio::sync::broadcast` channel, so any
//! number of observers (the host window, a status line, tests) can follow
//! tab changes without the manager knowing about them. Emitting with no
//! subscribers is fine.

use tokio::sync::broadcast;

use crate::tabs::TabId;

/// Events emitted by the tab manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// A tab was created by "new" or "open"
    TabOpened(TabId),
    /// A tab was removed and its surface destroyed
    TabClosed(TabId),
    /// The sole tab was reset to an empty untitled buffer
    TabReset(TabId),
    /// A tab became the active one
    TabActivated(TabId),
    /// A tab was dragged to a new index
    TabMoved { from: usize, to: usize },
    /// A tab's content was written to its path
    DocumentSaved(TabId),
    /// The window title changed
    WindowTitleChanged(String),
    /// The user asked to quit
    Quit,
}

/// Broadcast channel for [`EditorEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all current subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // No receivers is not an error.
        let _ = self.sender.send(event);
    }

    /// Returns a receiver for all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
