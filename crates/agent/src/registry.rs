//! Session registry
//!
//! Keyed store of live dialogue sessions. Each session carries its own
//! async mutex, so one utterance runs to completion before the next one
//! for the same id is admitted, while distinct sessions proceed in parallel.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex, MutexGuard};

use voice_banking_config::SessionConfig;

use crate::session::{DialogueSession, SessionSnapshot};
use crate::{AgentError, Result};

/// Registered session
pub struct SessionHandle {
    pub id: String,
    pub user_id: String,
    dialogue: Mutex<DialogueSession>,
    pub created_at: Instant,
    last_activity: RwLock<Instant>,
    active: RwLock<bool>,
    /// Open sockets bound to this session
    sockets: AtomicUsize,
}

impl SessionHandle {
    fn new(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        let id = id.into();
        let user_id = user_id.into();
        Self {
            dialogue: Mutex::new(DialogueSession::new(id.clone(), user_id.clone())),
            id,
            user_id,
            created_at: Instant::now(),
            last_activity: RwLock::new(Instant::now()),
            active: RwLock::new(true),
            sockets: AtomicUsize::new(0),
        }
    }

    /// Exclusive access to the dialogue for one turn
    pub async fn lock(&self) -> MutexGuard<'_, DialogueSession> {
        self.touch();
        self.dialogue.lock().await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.dialogue.lock().await.snapshot()
    }

    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }

    /// Mark closed; pending transfer descriptors must not be applied after this
    pub fn close(&self) {
        *self.active.write() = false;
    }

    pub fn is_active(&self) -> bool {
        *self.active.read()
    }

    pub fn socket_count(&self) -> usize {
        self.sockets.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Session registry
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
    max_sessions: usize,
    idle_timeout: Duration,
    cleanup_interval: Duration,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize) -> Self {
        let defaults = SessionConfig::default();
        Self::with_config(
            max_sessions,
            defaults.idle_timeout(),
            defaults.cleanup_interval(),
        )
    }

    pub fn with_config(
        max_sessions: usize,
        idle_timeout: Duration,
        cleanup_interval: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            idle_timeout,
            cleanup_interval,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::with_config(
            config.max_sessions,
            config.idle_timeout(),
            config.cleanup_interval(),
        )
    }

    /// Sweep idle sessions every `cleanup_interval` until the returned
    /// sender publishes `true`.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let registry = Arc::clone(self);
        let interval = registry.cleanup_interval;

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let removed = registry.cleanup_expired();
                        if removed > 0 {
                            tracing::info!(
                                removed,
                                remaining = registry.count(),
                                "Session cleanup"
                            );
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Fetch `session_id` if it exists, else create it.
    ///
    /// Without an id a fresh one is generated. Fails when the registry is
    /// full after sweeping idle sessions, or when the id belongs to another
    /// user.
    pub fn get_or_create(
        &self,
        user_id: &str,
        session_id: Option<&str>,
    ) -> Result<Arc<SessionHandle>> {
        let mut sessions = self.sessions.write();
        self.get_or_create_locked(&mut sessions, user_id, session_id)
    }

    /// Like [`get_or_create`](Self::get_or_create), and counts a socket
    /// against the session until [`detach`](Self::detach).
    pub fn attach(&self, user_id: &str, session_id: Option<&str>) -> Result<Arc<SessionHandle>> {
        let mut sessions = self.sessions.write();
        let handle = self.get_or_create_locked(&mut sessions, user_id, session_id)?;
        handle.sockets.fetch_add(1, Ordering::AcqRel);
        Ok(handle)
    }

    /// Release one socket. The session is removed only when this was its
    /// last socket and the registry still holds this exact handle.
    pub fn detach(&self, handle: &Arc<SessionHandle>) -> bool {
        let mut sessions = self.sessions.write();
        let previous = handle
            .sockets
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .unwrap_or(0);
        if previous > 1 {
            tracing::debug!(session_id = %handle.id, sockets = previous - 1, "Socket detached");
            return false;
        }

        let current = sessions
            .get(&handle.id)
            .is_some_and(|registered| Arc::ptr_eq(registered, handle));
        if !current {
            return false;
        }

        sessions.remove(&handle.id);
        handle.close();
        record_gauge(sessions.len());
        tracing::info!(session_id = %handle.id, "Removed session after last socket closed");
        true
    }

    fn get_or_create_locked(
        &self,
        sessions: &mut HashMap<String, Arc<SessionHandle>>,
        user_id: &str,
        session_id: Option<&str>,
    ) -> Result<Arc<SessionHandle>> {
        if let Some(existing) = session_id.and_then(|id| sessions.get(id)) {
            if existing.user_id != user_id {
                return Err(AgentError::SessionOwner {
                    session_id: existing.id.clone(),
                });
            }
            existing.touch();
            return Ok(Arc::clone(existing));
        }

        if sessions.len() >= self.max_sessions {
            self.cleanup_expired_internal(sessions);

            if sessions.len() >= self.max_sessions {
                tracing::warn!(max_sessions = self.max_sessions, "Session capacity reached");
                return Err(AgentError::Capacity(self.max_sessions));
            }
        }

        let id = session_id
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let handle = Arc::new(SessionHandle::new(id.clone(), user_id));
        sessions.insert(id.clone(), Arc::clone(&handle));
        record_gauge(sessions.len());

        tracing::info!(session_id = %id, user_id = %user_id, "Created session");

        Ok(handle)
    }

    pub fn get(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.read().get(id).cloned()
    }

    /// Close and drop a session; returns whether it existed
    pub fn remove(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write();
        let Some(handle) = sessions.remove(id) else {
            return false;
        };
        handle.close();
        record_gauge(sessions.len());
        tracing::info!(session_id = %id, "Removed session");
        true
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Drop idle sessions; returns how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        self.cleanup_expired_internal(&mut sessions)
    }

    fn cleanup_expired_internal(&self, sessions: &mut HashMap<String, Arc<SessionHandle>>) -> usize {
        let timeout = self.idle_timeout;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.is_expired(timeout))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            if let Some(handle) = sessions.remove(id) {
                handle.close();
                tracing::info!(session_id = %id, "Expired session");
            }
        }

        if !expired.is_empty() {
            record_gauge(sessions.len());
        }
        expired.len()
    }

    pub fn list(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }
}

fn record_gauge(count: usize) {
    metrics::gauge!("voice_banking_active_sessions").set(count as f64);
}
