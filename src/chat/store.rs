use std::sync::Arc;

use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use super::ChatError;
use crate::models::{Message, NewMessage};

/// Append-only conversation log.
///
/// Entries are kept in insertion order and never modified or removed.
pub struct ConversationStore {
    messages: Vec<Message>,
    clock: Arc<dyn Clock>,
}

impl ConversationStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            messages: Vec::new(),
            clock,
        }
    }

    /// Append a message after all existing entries.
    ///
    /// Assigns id, sequence and timestamp. Rejects blank content.
    pub fn append(&mut self, message: NewMessage) -> Result<&Message, ChatError> {
        if message.content.trim().is_empty() {
            return Err(ChatError::InvalidMessage);
        }

        let entry = Message {
            id: Uuid::new_v4(),
            sequence: self.messages.len() as u64,
            role: message.role,
            content: message.content,
            timestamp: self.clock.now(),
            metadata: message.metadata,
        };
        self.messages.push(entry);

        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Full log in insertion order.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
