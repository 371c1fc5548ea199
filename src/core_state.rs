//! Shared application state behind the HTTP API.
//!
//! `CoreState` owns the registry of live chat widgets (one per visitor
//! session), the server configuration and the mailer. Wrapped in `Arc` at
//! startup and shared with every handler.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use uuid::Uuid;

use crate::chat::{ChatWidget, Clock, SystemClock};
use crate::config::ServerConfig;
use crate::confirmation::{LogMailer, Mailer};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Chat session not found: {0}")]
    SessionNotFound(Uuid),
    #[error("Chat session limit reached: {0}")]
    SessionLimitReached(usize),
    #[error("Lock poisoned")]
    LockPoisoned,
}

pub struct CoreState {
    sessions: RwLock<HashMap<Uuid, Arc<ChatWidget>>>,
    pub config: ServerConfig,
    clock: Arc<dyn Clock>,
    mailer: Arc<dyn Mailer>,
}

impl CoreState {
    /// Create state with the wall clock and the logging mailer.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_parts(config, Arc::new(SystemClock), Arc::new(LogMailer))
    }

    pub fn with_parts(
        config: ServerConfig,
        clock: Arc<dyn Clock>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            clock,
            mailer,
        }
    }

    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    fn read_sessions(
        &self,
    ) -> Result<RwLockReadGuard<'_, HashMap<Uuid, Arc<ChatWidget>>>, CoreError> {
        self.sessions.read().map_err(|_| CoreError::LockPoisoned)
    }

    fn write_sessions(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, Arc<ChatWidget>>>, CoreError> {
        self.sessions.write().map_err(|_| CoreError::LockPoisoned)
    }

    // ── Session registry ────────────────────────────────────

    /// Start a new chat widget. Must run inside a tokio runtime.
    ///
    /// At the session cap, idle sessions are evicted first; if none are
    /// idle the request fails with `SessionLimitReached`.
    pub fn create_session(&self) -> Result<Arc<ChatWidget>, CoreError> {
        let max = self.config.max_sessions;
        let mut sessions = self.write_sessions()?;
        if sessions.len() >= max {
            evict_idle(&mut sessions, self.config.session_idle_timeout);
        }
        if sessions.len() >= max {
            tracing::warn!(max, "Chat session limit reached");
            return Err(CoreError::SessionLimitReached(max));
        }

        let widget = Arc::new(ChatWidget::spawn(
            self.config.reply_delay,
            Arc::clone(&self.clock),
        ));
        sessions.insert(widget.id(), Arc::clone(&widget));
        drop(sessions);

        tracing::info!(session_id = %widget.id(), "Chat session created");
        Ok(widget)
    }

    /// Look up a session. Counts as visitor activity.
    pub fn session(&self, id: Uuid) -> Result<Arc<ChatWidget>, CoreError> {
        let widget = self
            .read_sessions()?
            .get(&id)
            .cloned()
            .ok_or(CoreError::SessionNotFound(id))?;
        widget.touch();
        Ok(widget)
    }

    /// Remove a session and tear its widget down.
    pub fn remove_session(&self, id: Uuid) -> Result<(), CoreError> {
        let widget = self
            .write_sessions()?
            .remove(&id)
            .ok_or(CoreError::SessionNotFound(id))?;
        widget.shutdown();
        Ok(())
    }

    /// Tear down sessions idle for at least the configured timeout.
    pub fn evict_idle_sessions(&self) -> Result<usize, CoreError> {
        let mut sessions = self.write_sessions()?;
        Ok(evict_idle(&mut sessions, self.config.session_idle_timeout))
    }

    pub fn session_count(&self) -> usize {
        self.read_sessions().map(|s| s.len()).unwrap_or(0)
    }

    /// Tear down every session (server shutdown).
    pub fn clear_sessions(&self) {
        if let Ok(mut sessions) = self.sessions.write() {
            for (_, widget) in sessions.drain() {
                widget.shutdown();
            }
        }
        tracing::info!("All chat sessions torn down");
    }
}

fn evict_idle(sessions: &mut HashMap<Uuid, Arc<ChatWidget>>, timeout: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|id, widget| {
        let keep = widget.idle_for() < timeout;
        if !keep {
            widget.shutdown();
            tracing::info!(session_id = %id, "Idle chat session evicted");
        }
        keep
    });
    before - sessions.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_core() -> CoreState {
        CoreState::new(ServerConfig::default())
    }

    fn limited_core(max_sessions: usize, idle_secs: u64) -> CoreState {
        CoreState::new(ServerConfig {
            max_sessions,
            session_idle_timeout: Duration::from_secs(idle_secs),
            ..ServerConfig::default()
        })
    }

    #[tokio::test]
    async fn create_and_lookup_session() {
        let core = test_core();
        let widget = core.create_session().unwrap();

        let found = core.session(widget.id()).unwrap();
        assert!(Arc::ptr_eq(&widget, &found));
        assert_eq!(core.session_count(), 1);
    }

    #[tokio::test]
    async fn unknown_session_not_found() {
        let core = test_core();
        let id = Uuid::new_v4();
        assert!(matches!(
            core.session(id),
            Err(CoreError::SessionNotFound(missing)) if missing == id
        ));
        assert!(core.remove_session(id).is_err());
    }

    #[tokio::test]
    async fn remove_tears_widget_down() {
        let core = test_core();
        let widget = core.create_session().unwrap();
        core.remove_session(widget.id()).unwrap();

        assert!(widget.is_torn_down());
        assert_eq!(core.session_count(), 0);
        assert!(core.session(widget.id()).is_err());
    }

    #[tokio::test]
    async fn sessions_do_not_share_state() {
        let core = test_core();
        let a = core.create_session().unwrap();
        let b = core.create_session().unwrap();

        a.send_message("hi").unwrap();
        assert_eq!(a.messages().len(), 2);
        assert_eq!(b.messages().len(), 1);
    }

    #[tokio::test]
    async fn clear_sessions_empties_registry() {
        let core = test_core();
        let a = core.create_session().unwrap();
        core.create_session().unwrap();

        core.clear_sessions();
        assert_eq!(core.session_count(), 0);
        assert!(a.is_torn_down());
    }

    #[tokio::test(start_paused = true)]
    async fn session_cap_rejects_when_none_idle() {
        let core = limited_core(2, 60);
        core.create_session().unwrap();
        core.create_session().unwrap();

        assert!(matches!(
            core.create_session(),
            Err(CoreError::SessionLimitReached(2))
        ));
        assert_eq!(core.session_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cap_evicts_idle_sessions_first() {
        let core = limited_core(2, 60);
        let stale = core.create_session().unwrap();
        tokio::time::advance(Duration::from_secs(45)).await;
        let recent = core.create_session().unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;

        let fresh = core.create_session().unwrap();
        assert!(stale.is_torn_down());
        assert!(core.session(stale.id()).is_err());
        assert!(core.session(recent.id()).is_ok());
        assert!(core.session(fresh.id()).is_ok());
        assert_eq!(core.session_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_keeps_session_alive() {
        let core = limited_core(10, 60);
        let active = core.create_session().unwrap();
        let idle = core.create_session().unwrap();

        tokio::time::advance(Duration::from_secs(50)).await;
        core.session(active.id()).unwrap();
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(core.evict_idle_sessions().unwrap(), 1);
        assert!(idle.is_torn_down());
        assert!(!active.is_torn_down());
    }

    #[tokio::test(start_paused = true)]
    async fn pending_reply_blocks_eviction() {
        let core = CoreState::new(ServerConfig {
            reply_delay: Duration::from_secs(600),
            session_idle_timeout: Duration::from_secs(60),
            ..ServerConfig::default()
        });
        let widget = core.create_session().unwrap();
        widget.send_message("hi").unwrap();

        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(core.evict_idle_sessions().unwrap(), 0);
        assert!(!widget.is_torn_down());
    }
}
