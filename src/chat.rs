//! Research-participation chat assistant.
//!
//! The assistant is scripted: replies come from a fixed table keyed by the
//! conversation stage, delivered after a simulated delay.
//!
//! Layers, bottom up:
//! - `store`: append-only message log
//! - `responder`: pure `(input, stage) -> reply` table
//! - `gate`: input trimming / rejection
//! - `session`: owned widget state (log, stage, visibility, pending turns)
//! - `widget`: async handle running the delayed replies on tokio

pub mod clock;
pub mod gate;
pub mod responder;
pub mod session;
pub mod store;
pub mod widget;

use serde::Serialize;
use uuid::Uuid;

use crate::models::enums::ConversationStage;
use crate::models::Message;

pub use clock::{Clock, FixedClock, SystemClock};
pub use responder::{respond, Reply};
pub use session::{ChatSession, PendingTurn, SessionSnapshot, TurnOutcome};
pub use store::ConversationStore;
pub use widget::ChatWidget;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// Empty or whitespace-only content. The input gate drops these silently.
    #[error("Message content is empty")]
    InvalidMessage,
    #[error("Chat session has been torn down")]
    SessionClosed,
}

/// Notification pushed to widget subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    MessageAppended {
        session_id: Uuid,
        message: Message,
    },
    ComposingChanged {
        session_id: Uuid,
        composing: bool,
    },
    StageChanged {
        session_id: Uuid,
        from: ConversationStage,
        to: ConversationStage,
    },
    VisibilityChanged {
        session_id: Uuid,
        open: bool,
    },
}
