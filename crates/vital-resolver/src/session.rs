//! Session store seam: bearer credential and cached principal snapshot.
//!
//! # Purpose
//! Abstracts wherever the host application keeps its session (browser
//! storage bridge, keychain, test fixture). The resolver reads the
//! token and the last-known principal through this trait.
//!
//! # Security considerations
//! The one write the resolver performs is `clear_cached_principal`,
//! used to actively erase a cached privileged snapshot that fails the
//! allow-list check. Merely ignoring a forged snapshot would let it
//! leak into a later fast path.
use std::sync::{PoisonError, RwLock};
use vital_access::Principal;

pub trait SessionStore: Send + Sync {
    /// Opaque bearer credential for the current session, if any.
    fn bearer_token(&self) -> Option<String>;

    /// Last-known principal snapshot, if one was cached.
    fn cached_principal(&self) -> Option<Principal>;

    /// Erase the cached principal snapshot. Called when sanitization
    /// detects tampered privileged state.
    fn clear_cached_principal(&self);
}

/// In-memory session store for tests, demos, and embedding hosts that
/// manage their own persistence.
#[derive(Default)]
pub struct InMemorySessionStore {
    token: RwLock<Option<String>>,
    principal: RwLock<Option<Principal>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_token(Some(token.into()));
        store
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn set_cached_principal(&self, principal: Option<Principal>) {
        *self.principal.write().unwrap_or_else(PoisonError::into_inner) = principal;
    }
}

impl SessionStore for InMemorySessionStore {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn cached_principal(&self) -> Option<Principal> {
        self.principal.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn clear_cached_principal(&self) {
        *self.principal.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vital_access::Role;

    #[test]
    fn in_memory_store_round_trips() {
        let store = InMemorySessionStore::with_token("token-1");
        assert_eq!(store.bearer_token().as_deref(), Some("token-1"));
        assert!(store.cached_principal().is_none());

        let principal = Principal::new("u1", "doc@vital.example", Role::Doctor);
        store.set_cached_principal(Some(principal.clone()));
        assert_eq!(store.cached_principal(), Some(principal));

        store.clear_cached_principal();
        assert!(store.cached_principal().is_none());

        store.set_token(None);
        assert!(store.bearer_token().is_none());
    }
}
