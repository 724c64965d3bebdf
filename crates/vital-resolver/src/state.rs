//! Resolver state: the merged, current access view.
//!
//! # Purpose
//! One `ResolverState` value corresponds to exactly one resolution
//! outcome (deny-all, grant-all, or a server-built view). The resolver
//! publishes whole replacement values; nothing ever patches fields of
//! a live state, so consumers can never observe a mix of two fetches.
use crate::authority::AuthorityError;
use vital_access::{
    AccessSnapshot, ModuleFeatureMap, ModuleRegistry, PermissionSet, Principal, Quota,
};

/// Recorded failure from the last resolution attempt.
///
/// Stored by value (not the source error) so states stay cheaply
/// cloneable; the distinction only feeds diagnostics, never decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveFailure {
    AuthorityUnavailable(String),
    MalformedPayload(String),
}

impl ResolveFailure {
    pub fn message(&self) -> &str {
        match self {
            ResolveFailure::AuthorityUnavailable(message) => message,
            ResolveFailure::MalformedPayload(message) => message,
        }
    }
}

impl From<AuthorityError> for ResolveFailure {
    fn from(err: AuthorityError) -> Self {
        match err {
            AuthorityError::Transport(message) => ResolveFailure::AuthorityUnavailable(message),
            AuthorityError::Status(code) => {
                ResolveFailure::AuthorityUnavailable(format!("status {code}"))
            }
            AuthorityError::Decode(message) => ResolveFailure::MalformedPayload(message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolverState {
    pub principal: Option<Principal>,
    pub snapshot: AccessSnapshot,
    pub quota: Quota,
    pub loading: bool,
    pub last_error: Option<ResolveFailure>,
    /// Monotonic counter of terminal publications. Drives fetch
    /// coalescing and predicate memoization; loading states reuse the
    /// previous generation because they are not resolution outcomes.
    pub generation: u64,
}

impl ResolverState {
    /// Empty pre-session state.
    pub fn initial() -> Self {
        Self {
            principal: None,
            snapshot: AccessSnapshot::deny_all(),
            quota: Quota::disabled(),
            loading: false,
            last_error: None,
            generation: 0,
        }
    }

    /// Terminal deny-all. `last_error` is `None` for the expected
    /// no-session case and `Some` for recorded failures.
    pub fn deny_all(generation: u64, last_error: Option<ResolveFailure>) -> Self {
        Self {
            principal: None,
            snapshot: AccessSnapshot::deny_all(),
            quota: Quota::disabled(),
            loading: false,
            last_error,
            generation,
        }
    }

    /// Terminal grant-all for a validated super-admin: every known
    /// capability granted and every registered feature flag enabled,
    /// so even raw-map readers inside the crate see a consistent view.
    pub fn grant_all(generation: u64, principal: Principal, registry: &ModuleRegistry) -> Self {
        Self {
            principal: Some(principal),
            snapshot: AccessSnapshot::new(
                true,
                PermissionSet::grant_all(),
                ModuleFeatureMap::enable_all(registry.feature_flags()),
            ),
            quota: Quota::disabled(),
            loading: false,
            last_error: None,
            generation,
        }
    }

    /// Terminal server-built state for a non-privileged principal:
    /// exactly the returned maps, no local elevation.
    pub fn resolved(
        generation: u64,
        principal: Principal,
        permissions: PermissionSet,
        features: ModuleFeatureMap,
        quota: Quota,
    ) -> Self {
        let is_super_admin = principal.is_super_admin;
        Self {
            principal: Some(principal),
            snapshot: AccessSnapshot::new(is_super_admin, permissions, features),
            quota,
            loading: false,
            last_error: None,
            generation,
        }
    }

    /// Transitional state while a fetch is in flight. Consumers must
    /// not render protected content while this is current.
    pub fn loading(previous: &ResolverState) -> Self {
        Self {
            principal: previous.principal.clone(),
            snapshot: AccessSnapshot::deny_all(),
            quota: Quota::disabled(),
            loading: true,
            last_error: None,
            generation: previous.generation,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.snapshot.is_super_admin
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        !self.loading && self.snapshot.allows_capability(capability)
    }

    pub fn has_module(&self, flag: &str) -> bool {
        !self.loading && self.snapshot.enables_module(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vital_access::{Role, CAP_MANAGE_USERS};

    #[test]
    fn initial_state_denies_everything() {
        let state = ResolverState::initial();
        assert!(!state.loading);
        assert!(state.last_error.is_none());
        assert!(!state.is_super_admin());
        assert!(!state.has_capability(CAP_MANAGE_USERS));
        assert!(!state.has_module("dna_sequencing_module"));
    }

    #[test]
    fn grant_all_enables_every_registered_flag() {
        let registry = ModuleRegistry::platform_default().expect("registry");
        let principal = Principal {
            id: "u1".to_string(),
            email: "root@vital.example".to_string(),
            role: Role::SuperAdmin,
            is_super_admin: true,
        };
        let state = ResolverState::grant_all(1, principal, &registry);
        assert!(state.is_super_admin());
        for descriptor in registry.descriptors() {
            assert!(state.has_module(descriptor.feature_flag));
        }
        assert!(state.has_capability(CAP_MANAGE_USERS));
    }

    #[test]
    fn loading_state_blocks_access_checks() {
        let registry = ModuleRegistry::platform_default().expect("registry");
        let principal = Principal {
            id: "u1".to_string(),
            email: "root@vital.example".to_string(),
            role: Role::SuperAdmin,
            is_super_admin: true,
        };
        let granted = ResolverState::grant_all(3, principal, &registry);
        let loading = ResolverState::loading(&granted);
        assert!(loading.loading);
        assert_eq!(loading.generation, 3);
        assert!(!loading.has_capability(CAP_MANAGE_USERS));
        assert!(!loading.has_module("dna_sequencing_module"));
    }

    #[test]
    fn failure_maps_to_recorded_error_kind() {
        let failure: ResolveFailure = AuthorityError::Status(503).into();
        assert!(matches!(failure, ResolveFailure::AuthorityUnavailable(_)));
        let failure: ResolveFailure = AuthorityError::Decode("missing user".to_string()).into();
        assert!(matches!(failure, ResolveFailure::MalformedPayload(_)));
    }

    #[test]
    fn deny_all_with_error_still_denies_like_no_session() {
        let clean = ResolverState::deny_all(1, None);
        let failed = ResolverState::deny_all(
            2,
            Some(ResolveFailure::AuthorityUnavailable("timeout".to_string())),
        );
        assert_eq!(clean.snapshot, failed.snapshot);
        assert!(failed.last_error.is_some());
    }
}
