use super::types::Message;
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only message list shared between the UI thread and dispatch tasks.
///
/// Entries are never removed or reordered; clones share the same backing
/// list, so background tasks append through the same storage the frame loop
/// reads.
#[derive(Debug, Clone, Default)]
pub struct MessageStorage {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl MessageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: Message) {
        self.messages.write().push(message);
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}
