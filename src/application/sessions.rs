//! Per-browser-session credential storage.
//!
//! Each session carries at most one credential and at most one outstanding
//! OAuth `state` value. Nothing is persisted. An entry is dropped once it
//! holds neither, and unanswered states expire after a fixed window.

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::domain::credential::Credential;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

/// How long a consent round trip may take before its state is discarded.
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(600);

#[derive(Debug)]
struct PendingState {
    value: String,
    issued_at: Instant,
}

#[derive(Debug, Default)]
struct SessionEntry {
    credential: Option<Credential>,
    pending_state: Option<PendingState>,
}

impl SessionEntry {
    fn is_empty(&self) -> bool {
        self.credential.is_none() && self.pending_state.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    entries: Arc<DashMap<SessionId, SessionEntry>>,
    state_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_state_ttl(DEFAULT_STATE_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state_ttl(state_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            state_ttl,
        }
    }

    /// Issue a fresh OAuth state for `session`, replacing any earlier one.
    pub fn issue_state(&self, session: SessionId) -> String {
        let now = Instant::now();
        self.prune_expired_states(now);

        let value = Uuid::new_v4().simple().to_string();
        self.entries.entry(session).or_default().pending_state = Some(PendingState {
            value: value.clone(),
            issued_at: now,
        });
        value
    }

    /// Remove the outstanding state for `session` and report whether it
    /// matched `presented`. A state is usable once and only within the TTL.
    pub fn take_state(&self, session: SessionId, presented: &str) -> bool {
        let pending = self
            .entries
            .get_mut(&session)
            .and_then(|mut entry| entry.pending_state.take());
        self.remove_if_empty(session);

        let Some(pending) = pending else {
            return false;
        };
        if pending.issued_at.elapsed() >= self.state_ttl {
            return false;
        }
        pending.value.as_bytes().ct_eq(presented.as_bytes()).unwrap_u8() == 1
    }

    pub fn store_credential(&self, session: SessionId, credential: Credential) {
        self.entries.entry(session).or_default().credential = Some(credential);
    }

    pub fn credential(&self, session: SessionId) -> Option<Credential> {
        self.entries
            .get(&session)
            .and_then(|entry| entry.credential.clone())
    }

    pub fn has_credential(&self, session: SessionId) -> bool {
        self.entries
            .get(&session)
            .is_some_and(|entry| entry.credential.is_some())
    }

    /// Drop the credential held for `session`, returning whether one existed.
    pub fn clear_credential(&self, session: SessionId) -> bool {
        let cleared = self
            .entries
            .get_mut(&session)
            .and_then(|mut entry| entry.credential.take())
            .is_some();
        self.remove_if_empty(session);
        cleared
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Callers must not hold a guard into `entries` here.
    fn remove_if_empty(&self, session: SessionId) {
        self.entries.remove_if(&session, |_, entry| entry.is_empty());
    }

    fn prune_expired_states(&self, now: Instant) {
        let ttl = self.state_ttl;
        self.entries.retain(|_, entry| {
            if entry
                .pending_state
                .as_ref()
                .is_some_and(|pending| now.duration_since(pending.issued_at) >= ttl)
            {
                entry.pending_state = None;
            }
            !entry.is_empty()
        });
    }
}
