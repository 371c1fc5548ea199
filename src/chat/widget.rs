//! Async chat widget: a `ChatSession` plus the worker that delivers the
//! delayed assistant replies.
//!
//! Each widget owns one tokio task fed by an unbounded queue of turns. The
//! task answers turns one at a time; a turn is due `reply_delay` after it was
//! submitted or after the previous reply, whichever is later. Results are
//! pushed to subscribers as `ChatEvent`s.
//!
//! Must be created inside a tokio runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use super::clock::Clock;
use super::session::{ChatSession, SessionSnapshot};
use super::{ChatError, ChatEvent};
use crate::models::enums::ConversationStage;
use crate::models::Message;

/// Buffered events per subscriber before lagging ones start missing events.
const EVENT_CAPACITY: usize = 64;

#[derive(Debug)]
struct QueuedTurn {
    id: Uuid,
    queued_at: Instant,
}

pub struct ChatWidget {
    id: Uuid,
    session: Arc<Mutex<ChatSession>>,
    turns: mpsc::UnboundedSender<QueuedTurn>,
    events: broadcast::Sender<ChatEvent>,
    cancel: Arc<Notify>,
    torn_down: AtomicBool,
    last_active: Mutex<Instant>,
    worker: JoinHandle<()>,
}

impl ChatWidget {
    /// Create a widget and start its reply worker.
    pub fn spawn(reply_delay: Duration, clock: Arc<dyn Clock>) -> Self {
        let session = ChatSession::new(clock);
        let id = session.id();
        let session = Arc::new(Mutex::new(session));
        let (turns, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let cancel = Arc::new(Notify::new());

        let worker = tokio::spawn(run_turns(
            id,
            Arc::clone(&session),
            rx,
            events.clone(),
            Arc::clone(&cancel),
            reply_delay,
        ));

        Self {
            id,
            session,
            turns,
            events,
            cancel,
            torn_down: AtomicBool::new(false),
            last_active: Mutex::new(Instant::now()),
            worker,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Record visitor activity for idle eviction.
    pub fn touch(&self) {
        *self
            .last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Time since the last visitor activity. A widget with replies still
    /// outstanding never counts as idle.
    pub fn idle_for(&self) -> Duration {
        if self.is_composing() {
            return Duration::ZERO;
        }
        self.last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    // ── Visibility ──────────────────────────────────────────

    pub fn is_open(&self) -> bool {
        lock(&self.session).is_open()
    }

    pub fn open(&self) -> bool {
        self.touch();
        lock(&self.session).open();
        self.emit_visibility(true)
    }

    pub fn close(&self) -> bool {
        self.touch();
        lock(&self.session).close();
        self.emit_visibility(false)
    }

    pub fn toggle(&self) -> bool {
        self.touch();
        let open = lock(&self.session).toggle();
        self.emit_visibility(open)
    }

    fn emit_visibility(&self, open: bool) -> bool {
        let _ = self.events.send(ChatEvent::VisibilityChanged {
            session_id: self.id,
            open,
        });
        open
    }

    // ── Conversation ────────────────────────────────────────

    /// Submit user text.
    ///
    /// Blank text is dropped silently (`Ok(None)`). Otherwise the `user`
    /// message is appended immediately and its reply is scheduled.
    pub fn send_message(&self, text: &str) -> Result<Option<Message>, ChatError> {
        if self.torn_down.load(Ordering::SeqCst) {
            return Err(ChatError::SessionClosed);
        }

        self.touch();

        // Queue and announce under the guard: channel order must match the
        // pending order, and user events must precede the reply events.
        let mut session = lock(&self.session);
        let was_composing = session.is_composing();
        let message = match session.submit(text) {
            Ok((message, _turn)) => message,
            Err(ChatError::InvalidMessage) => {
                tracing::debug!(session_id = %self.id, "Blank chat input dropped");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        self.turns
            .send(QueuedTurn {
                id: message.id,
                queued_at: Instant::now(),
            })
            .map_err(|_| ChatError::SessionClosed)?;

        tracing::debug!(session_id = %self.id, turn_id = %message.id, "Chat turn queued");

        let _ = self.events.send(ChatEvent::MessageAppended {
            session_id: self.id,
            message: message.clone(),
        });
        if !was_composing {
            let _ = self.events.send(ChatEvent::ComposingChanged {
                session_id: self.id,
                composing: true,
            });
        }
        drop(session);

        Ok(Some(message))
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.session).messages().to_vec()
    }

    pub fn stage(&self) -> ConversationStage {
        lock(&self.session).stage()
    }

    pub fn is_composing(&self) -> bool {
        lock(&self.session).is_composing()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        lock(&self.session).snapshot()
    }

    /// Drop all replies that have not been delivered yet.
    pub fn cancel_pending(&self) -> usize {
        let dropped = lock(&self.session).cancel_pending();
        self.cancel.notify_waiters();

        if dropped > 0 {
            tracing::debug!(session_id = %self.id, dropped, "Pending chat turns cancelled");
            let _ = self.events.send(ChatEvent::ComposingChanged {
                session_id: self.id,
                composing: false,
            });
        }
        dropped
    }

    /// Tear the widget down: cancel pending replies and stop the worker.
    /// Later sends fail with `SessionClosed`. Safe to call twice.
    pub fn shutdown(&self) -> usize {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return 0;
        }
        let dropped = self.cancel_pending();
        self.worker.abort();
        tracing::info!(session_id = %self.id, dropped, "Chat widget torn down");
        dropped
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

impl Drop for ChatWidget {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

fn lock(session: &Mutex<ChatSession>) -> MutexGuard<'_, ChatSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_turns(
    session_id: Uuid,
    session: Arc<Mutex<ChatSession>>,
    mut rx: mpsc::UnboundedReceiver<QueuedTurn>,
    events: broadcast::Sender<ChatEvent>,
    cancel: Arc<Notify>,
    reply_delay: Duration,
) {
    let mut last_reply: Option<Instant> = None;

    while let Some(turn) = rx.recv().await {
        if !lock(&session).is_pending(turn.id) {
            continue;
        }

        let start = match last_reply {
            Some(at) if at > turn.queued_at => at,
            _ => turn.queued_at,
        };

        tokio::select! {
            _ = tokio::time::sleep_until(start + reply_delay) => {}
            _ = cancel.notified() => {
                tracing::debug!(%session_id, turn_id = %turn.id, "Chat turn cancelled while waiting");
                continue;
            }
        }

        let outcome = lock(&session).complete_turn(turn.id);
        let Some(outcome) = outcome else {
            continue;
        };
        last_reply = Some(Instant::now());

        tracing::debug!(
            %session_id,
            turn_id = %turn.id,
            stage = %outcome.stage,
            "Chat reply delivered"
        );

        let _ = events.send(ChatEvent::MessageAppended {
            session_id,
            message: outcome.reply.clone(),
        });
        if outcome.stage_changed() {
            let _ = events.send(ChatEvent::StageChanged {
                session_id,
                from: outcome.previous_stage,
                to: outcome.stage,
            });
        }
        if !outcome.composing {
            let _ = events.send(ChatEvent::ComposingChanged {
                session_id,
                composing: false,
            });
        }
    }
}
