use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ConversationStage, MessageRole};
use super::prescreening::PreScreeningData;

/// One entry of a widget's conversation log.
///
/// Built only by `ConversationStore::append`; the store hands out shared
/// references, so a written message never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// Position in the log, starting at 0.
    pub sequence: u64,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub stage: Option<ConversationStage>,
    /// Reserved for pre-screening integration. Never read by the responder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<PreScreeningData>,
}

impl MessageMetadata {
    pub fn for_stage(stage: ConversationStage) -> Self {
        Self {
            stage: Some(stage),
            form_data: None,
        }
    }
}

/// Input to `ConversationStore::append`. Identity and timestamp are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub role: MessageRole,
    pub content: String,
    pub metadata: Option<MessageMetadata>,
}

impl NewMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            metadata: None,
        }
    }

    pub fn assistant(content: impl Into<String>, stage: ConversationStage) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            metadata: Some(MessageMetadata::for_stage(stage)),
        }
    }
}
