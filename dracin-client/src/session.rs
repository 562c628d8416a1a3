//! Session store: the access/refresh token pair and the signed-in admin.
//!
//! One [`SessionStore`] is created at startup and cloned into whatever needs
//! it. State changes only through [`SessionStore::dispatch`]; every change is
//! persisted (best-effort) and announced to subscribers.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dracin_model::{AdminUser, TokenGrant};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, SESSION_KEY, load_json, save_json};

/// Tokens and profile of the signed-in admin, as persisted.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Bearer token for API calls.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Token exchanged at `POST /refresh`.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Profile returned with the grant.
    #[serde(default)]
    pub user: Option<AdminUser>,
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("user", &self.user)
            .finish()
    }
}

impl SessionState {
    /// True when a non-empty access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none()
            && self.refresh_token.is_none()
            && self.user.is_none()
    }

    fn from_grant(grant: TokenGrant) -> Self {
        Self {
            access_token: Some(grant.access_token).filter(|t| !t.is_empty()),
            refresh_token: grant.refresh_token.filter(|t| !t.is_empty()),
            user: grant.user,
        }
    }
}

/// Why a session was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    /// Explicit logout.
    SignedOut,
    /// The server rejected the tokens and a refresh did not help.
    Expired,
}

/// Transitions accepted by [`SessionStore::dispatch`].
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// A fresh login grant replaces everything.
    SignedIn(TokenGrant),
    /// A refresh grant; the refresh token and user fall back to the current
    /// ones when the grant omits them.
    Refreshed(TokenGrant),
    /// Reload from storage.
    Restore,
    /// Drop the session and its stored copy.
    Clear(ClearReason),
}

/// What a dispatch did, as seen by subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    /// A login replaced the session.
    SignedIn,
    /// The access token was renewed.
    Refreshed,
    /// State was reloaded from storage.
    Restored,
    /// The session was dropped.
    Cleared(ClearReason),
}

type Listener = Arc<dyn Fn(&SessionState, SessionChange) + Send + Sync>;

struct Inner {
    state: RwLock<SessionState>,
    store: Arc<dyn KeyValueStore>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener: AtomicU64,
}

/// Shared, persisted auth state with change listeners. Clones share state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.inner.state.read())
            .field("listeners", &self.inner.listeners.lock().len())
            .finish()
    }
}

impl SessionStore {
    /// Empty session backed by `store`. Call
    /// `dispatch(SessionAction::Restore)` to pick up a saved session.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(SessionState::default()),
                store,
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(0),
            }),
        }
    }

    /// Convenience for `new` followed by a restore.
    pub fn restored(store: Arc<dyn KeyValueStore>) -> Self {
        let session = Self::new(store);
        session.dispatch(SessionAction::Restore);
        session
    }

    /// Snapshot of the current state.
    pub fn get_state(&self) -> SessionState {
        self.inner.state.read().clone()
    }

    /// Current access token, if non-empty.
    pub fn access_token(&self) -> Option<String> {
        self.inner
            .state
            .read()
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.inner.state.read().refresh_token.clone()
    }

    /// Profile of the signed-in admin.
    pub fn user(&self) -> Option<AdminUser> {
        self.inner.state.read().user.clone()
    }

    /// Apply `action`, persist the result and notify listeners.
    pub fn dispatch(&self, action: SessionAction) {
        let (snapshot, change) = {
            let mut state = self.inner.state.write();
            let change = match action {
                SessionAction::SignedIn(grant) => {
                    *state = SessionState::from_grant(grant);
                    self.persist(&state);
                    SessionChange::SignedIn
                }
                SessionAction::Refreshed(grant) => {
                    let previous = std::mem::take(&mut *state);
                    let mut next = SessionState::from_grant(grant);
                    if next.refresh_token.is_none() {
                        next.refresh_token = previous.refresh_token;
                    }
                    if next.user.is_none() {
                        next.user = previous.user;
                    }
                    *state = next;
                    self.persist(&state);
                    SessionChange::Refreshed
                }
                SessionAction::Restore => {
                    *state = self.load();
                    SessionChange::Restored
                }
                SessionAction::Clear(reason) => {
                    *state = SessionState::default();
                    self.persist(&state);
                    SessionChange::Cleared(reason)
                }
            };
            (state.clone(), change)
        };

        debug!(?change, authenticated = snapshot.is_authenticated(), "session updated");
        self.notify(&snapshot, change);
    }

    /// Register `listener` for every subsequent dispatch. Dropping the
    /// returned handle unsubscribes.
    pub fn subscribe<F>(&self, listener: F) -> SessionSubscription
    where
        F: Fn(&SessionState, SessionChange) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        SessionSubscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn notify(&self, state: &SessionState, change: SessionChange) {
        // Snapshot so listeners may subscribe/unsubscribe re-entrantly.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(state, change)))
                .is_err()
            {
                warn!("session listener panicked");
            }
        }
    }

    fn persist(&self, state: &SessionState) {
        let store = self.inner.store.as_ref();
        let result = if state.is_empty() {
            store.remove(SESSION_KEY)
        } else {
            save_json(store, SESSION_KEY, state)
        };
        if let Err(err) = result {
            warn!(error = %err, "failed to persist session");
        }
    }

    fn load(&self) -> SessionState {
        match load_json::<SessionState>(self.inner.store.as_ref(), SESSION_KEY)
        {
            Ok(Some(state)) => state,
            Ok(None) => SessionState::default(),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable saved session");
                SessionState::default()
            }
        }
    }
}

/// Handle returned by [`SessionStore::subscribe`].
pub struct SessionSubscription {
    id: u64,
    inner: Weak<Inner>,
}

impl fmt::Debug for SessionSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSubscription")
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}
