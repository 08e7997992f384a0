//! Per-user conversation sessions.
//!
//! Each user owns one [`UserSession`] behind its own async mutex, so events
//! from the same user are processed one at a time while different users
//! never wait on each other. The map itself is only locked long enough to
//! look up or insert a handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use teloxide::types::UserId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

/// Progress of an order capture
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    /// No item chosen yet
    #[default]
    Idle,
    AwaitingQuantity {
        item_code: String,
    },
    AwaitingName {
        item_code: String,
        quantity: u32,
    },
}

/// Conversation state of one user
#[derive(Debug)]
pub struct UserSession {
    pub state: OrderState,
    last_active: Instant,
}

impl UserSession {
    fn new() -> Self {
        Self {
            state: OrderState::Idle,
            last_active: Instant::now(),
        }
    }

    /// Forget everything captured so far
    pub fn reset(&mut self) {
        self.state = OrderState::Idle;
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_active.elapsed() > ttl
    }
}

type SessionHandle = Arc<AsyncMutex<UserSession>>;

/// Mapping from user identity to that user's session
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, SessionHandle>>,
    ttl: Duration,
}

impl SessionStore {
    /// Sessions idle for longer than `ttl` start over on their next event.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn map(&self) -> MutexGuard<'_, HashMap<UserId, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the session of `user`, creating it on first contact.
    ///
    /// An expired session is reset before it is handed out. The guard keeps
    /// other events of the same user waiting until it is dropped.
    pub async fn lock(&self, user: UserId) -> OwnedMutexGuard<UserSession> {
        let handle = Arc::clone(
            self.map()
                .entry(user)
                .or_insert_with(|| Arc::new(AsyncMutex::new(UserSession::new()))),
        );

        let mut session = handle.lock_owned().await;
        if session.is_expired(self.ttl) {
            debug!(user_id = %user, state = ?session.state, "Session expired, starting over");
            session.reset();
        }
        session.last_active = Instant::now();
        session
    }

    /// Current state of `user`, `Idle` when unknown or expired.
    pub async fn state(&self, user: UserId) -> OrderState {
        let handle = self.map().get(&user).cloned();
        match handle {
            Some(handle) => {
                let session = handle.lock().await;
                if session.is_expired(self.ttl) {
                    OrderState::Idle
                } else {
                    session.state.clone()
                }
            }
            None => OrderState::Idle,
        }
    }

    /// Number of sessions currently held
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }

    /// Drop expired sessions, returning how many were removed.
    ///
    /// A session whose handle is held outside the map is in use and kept.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut map = self.map();
        let before = map.len();
        map.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            handle
                .try_lock()
                .map(|session| !session.is_expired(ttl))
                .unwrap_or(true)
        });
        before - map.len()
    }

    /// Run [`purge_expired`](Self::purge_expired) every `every`.
    pub fn spawn_sweeper(store: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let removed = store.purge_expired();
                if removed > 0 {
                    debug!(removed, remaining = store.len(), "Expired sessions purged");
                }
            }
        })
    }
}
