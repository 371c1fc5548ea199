//! Owned state of one chat widget.
//!
//! `ChatSession` is synchronous and runtime-free: the widget layer decides
//! when a turn is due and calls `complete_turn`. Pending turns are answered
//! strictly in submission order, each against the stage left by the turn
//! before it.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::clock::Clock;
use super::gate::accept_input;
use super::responder::{respond, GREETING_MESSAGE};
use super::store::ConversationStore;
use super::ChatError;
use crate::models::enums::ConversationStage;
use crate::models::{Message, NewMessage};

/// A submitted user message still waiting for its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    /// Id of the `user` message that opened the turn.
    pub id: Uuid,
    pub input: String,
}

/// Result of answering a turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: Message,
    pub previous_stage: ConversationStage,
    pub stage: ConversationStage,
    /// Whether other turns are still waiting.
    pub composing: bool,
}

impl TurnOutcome {
    pub fn stage_changed(&self) -> bool {
        self.previous_stage != self.stage
    }
}

/// Render-ready copy of the session state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub open: bool,
    pub composing: bool,
    pub stage: ConversationStage,
    pub messages: Vec<Message>,
}

pub struct ChatSession {
    id: Uuid,
    open: bool,
    store: ConversationStore,
    stage: ConversationStage,
    pending: VecDeque<PendingTurn>,
}

impl ChatSession {
    /// Fresh session: closed, at `greeting`, log seeded with the greeting.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let mut store = ConversationStore::new(clock);
        let stage = ConversationStage::default();
        // GREETING_MESSAGE is non-empty, so the append cannot be rejected.
        let _ = store.append(NewMessage::assistant(GREETING_MESSAGE, stage));

        Self {
            id: Uuid::new_v4(),
            open: false,
            store,
            stage,
            pending: VecDeque::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    // ── Visibility ──────────────────────────────────────────

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Flip visibility and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    // ── Conversation ────────────────────────────────────────

    pub fn stage(&self) -> ConversationStage {
        self.stage
    }

    pub fn messages(&self) -> &[Message] {
        self.store.all()
    }

    /// True while at least one reply is outstanding.
    pub fn is_composing(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, turn_id: Uuid) -> bool {
        self.pending.iter().any(|t| t.id == turn_id)
    }

    /// Gate raw input, append it as a `user` message and queue its turn.
    ///
    /// Blank input returns `InvalidMessage` and leaves the session untouched.
    pub fn submit(&mut self, raw: &str) -> Result<(Message, PendingTurn), ChatError> {
        let text = accept_input(raw)?;
        let message = self.store.append(NewMessage::user(text))?.clone();

        let turn = PendingTurn {
            id: message.id,
            input: message.content.clone(),
        };
        self.pending.push_back(turn.clone());

        Ok((message, turn))
    }

    /// Answer the oldest pending turn if it is `turn_id`.
    ///
    /// Returns `None` when the turn was cancelled or is not next in line.
    pub fn complete_turn(&mut self, turn_id: Uuid) -> Option<TurnOutcome> {
        if self.pending.front().map(|t| t.id) != Some(turn_id) {
            return None;
        }
        let turn = self.pending.pop_front()?;

        let previous_stage = self.stage;
        let reply = respond(&turn.input, previous_stage);
        let message = self
            .store
            .append(NewMessage::assistant(reply.text, previous_stage))
            .ok()?
            .clone();
        self.stage = reply.next_stage;

        Some(TurnOutcome {
            reply: message,
            previous_stage,
            stage: self.stage,
            composing: self.is_composing(),
        })
    }

    /// Drop every outstanding turn. Returns how many were dropped.
    pub fn cancel_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            open: self.open,
            composing: self.is_composing(),
            stage: self.stage,
            messages: self.store.all().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::clock::SystemClock;
    use crate::chat::responder::{FALLBACK_REPLY, PRESCREENING_REQUEST, STUDY_LISTING};
    use crate::models::enums::MessageRole;

    fn test_session() -> ChatSession {
        ChatSession::new(Arc::new(SystemClock))
    }

    #[test]
    fn new_session_starts_with_greeting() {
        let session = test_session();
        assert!(!session.is_open());
        assert!(!session.is_composing());
        assert_eq!(session.stage(), ConversationStage::Greeting);

        let log = session.messages();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].role, MessageRole::Assistant);
        assert_eq!(log[0].content, GREETING_MESSAGE);
        assert_eq!(
            log[0].metadata.as_ref().and_then(|m| m.stage),
            Some(ConversationStage::Greeting)
        );
    }

    #[test]
    fn open_close_toggle() {
        let mut session = test_session();
        session.open();
        assert!(session.is_open());
        session.close();
        assert!(!session.is_open());
        assert!(session.toggle());
        assert!(!session.toggle());
    }

    #[test]
    fn submit_appends_trimmed_user_message() {
        let mut session = test_session();
        let (message, turn) = session.submit("  こんにちは  ").unwrap();

        assert_eq!(message.role, MessageRole::User);
        assert_eq!(message.content, "こんにちは");
        assert_eq!(turn.id, message.id);
        assert!(session.is_composing());
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn blank_submit_is_noop() {
        let mut session = test_session();
        assert_eq!(session.submit("   ").unwrap_err(), ChatError::InvalidMessage);
        assert_eq!(session.messages().len(), 1);
        assert!(!session.is_composing());
    }

    #[test]
    fn complete_turn_replies_and_advances() {
        let mut session = test_session();
        let (_, turn) = session.submit("こんにちは").unwrap();

        let outcome = session.complete_turn(turn.id).unwrap();
        assert_eq!(outcome.reply.role, MessageRole::Assistant);
        assert_eq!(outcome.reply.content, PRESCREENING_REQUEST);
        assert_eq!(outcome.previous_stage, ConversationStage::Greeting);
        assert_eq!(outcome.stage, ConversationStage::Prescreening);
        assert!(outcome.stage_changed());
        assert!(!outcome.composing);

        assert_eq!(session.stage(), ConversationStage::Prescreening);
        assert_eq!(session.messages().len(), 3);
        assert!(!session.is_composing());
    }

    #[test]
    fn queued_turns_answer_in_order_against_updated_stage() {
        let mut session = test_session();
        let (_, first) = session.submit("一つ目").unwrap();
        let (_, second) = session.submit("二つ目").unwrap();
        assert_eq!(session.pending_count(), 2);

        // Out of order completion is refused.
        assert!(session.complete_turn(second.id).is_none());

        let a = session.complete_turn(first.id).unwrap();
        assert_eq!(a.reply.content, PRESCREENING_REQUEST);
        assert!(a.composing);

        let b = session.complete_turn(second.id).unwrap();
        assert_eq!(b.reply.content, STUDY_LISTING);
        assert!(!b.stage_changed());
        assert!(!b.composing);

        let roles: Vec<MessageRole> = session.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::Assistant,
            ]
        );
    }

    #[test]
    fn cancelled_turn_is_never_answered() {
        let mut session = test_session();
        let (_, turn) = session.submit("hello").unwrap();

        assert_eq!(session.cancel_pending(), 1);
        assert!(!session.is_composing());
        assert!(session.complete_turn(turn.id).is_none());
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.stage(), ConversationStage::Greeting);
    }

    #[test]
    fn later_stages_keep_falling_back() {
        let mut session = test_session();
        for text in ["a", "b", "c"] {
            let (_, turn) = session.submit(text).unwrap();
            session.complete_turn(turn.id).unwrap();
        }
        // Never leaves prescreening; the fallback is unreachable from here.
        assert_eq!(session.stage(), ConversationStage::Prescreening);
        assert!(session
            .messages()
            .iter()
            .all(|m| m.content != FALLBACK_REPLY));
    }

    #[test]
    fn snapshot_mirrors_state() {
        let mut session = test_session();
        session.open();
        session.submit("hi").unwrap();

        let snap = session.snapshot();
        assert_eq!(snap.id, session.id());
        assert!(snap.open);
        assert!(snap.composing);
        assert_eq!(snap.messages.len(), 2);
    }

    #[test]
    fn sessions_are_independent() {
        let mut a = test_session();
        let b = test_session();
        let (_, turn) = a.submit("hi").unwrap();
        a.complete_turn(turn.id).unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(b.stage(), ConversationStage::Greeting);
        assert_eq!(b.messages().len(), 1);
    }
}
