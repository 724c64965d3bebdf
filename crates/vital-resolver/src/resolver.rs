//! Permission resolver: the only place trust decisions are made.
//!
//! # Purpose and responsibility
//! Orchestrates the resolution lifecycle: no-session deny-all, the
//! validated super-admin fast path, the authority fetch, and the
//! deny-all failure policy. Owns the resolver state exclusively and
//! publishes whole replacement values.
//!
//! # Key invariants and assumptions
//! - Consumers never see raw permission or feature maps; access goes
//!   through accessors and generated predicates.
//! - Concurrent `initialize`/`refresh` calls coalesce onto at most one
//!   in-flight authority call; every caller observes the winner's
//!   published state.
//! - A fetch result arriving after the session epoch changed (logout)
//!   is discarded, never applied.
//!
//! # Security considerations
//! - The grant-all override is only reachable through the allow-list
//!   validated fast path or a server-returned privileged role, never
//!   through a bare cached boolean.
//! - Failures collapse to deny-all; there is no partial-trust state
//!   and no silent reuse of a previous grant.
use crate::authority::{AccessPayload, AuthorityClient, HttpAuthorityClient};
use crate::config::ResolverConfig;
use crate::session::SessionStore;
use crate::state::{ResolveFailure, ResolverState};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::Mutex as AsyncMutex;
use vital_access::{
    build_predicates, ModuleFeatureMap, ModuleRegistry, PermissionSet, PredicateMap, Principal,
    QuotaEvaluator, Role, SuperAdminAllowList,
};

pub struct PermissionResolver {
    authority: Arc<dyn AuthorityClient>,
    session: Arc<dyn SessionStore>,
    registry: ModuleRegistry,
    allow_list: SuperAdminAllowList,
    state: RwLock<Arc<ResolverState>>,
    /// Serializes authority fetches; see `resolve` for the
    /// coalescing protocol layered on top.
    fetch_lock: AsyncMutex<()>,
    next_generation: AtomicU64,
    /// Bumped on `end_session`; in-flight results from an older epoch
    /// are discarded on arrival.
    epoch: AtomicU64,
    predicate_cache: Mutex<Option<(u64, PredicateMap)>>,
}

impl PermissionResolver {
    pub fn new(
        authority: Arc<dyn AuthorityClient>,
        session: Arc<dyn SessionStore>,
        registry: ModuleRegistry,
        allow_list: SuperAdminAllowList,
    ) -> Self {
        Self {
            authority,
            session,
            registry,
            allow_list,
            state: RwLock::new(Arc::new(ResolverState::initial())),
            fetch_lock: AsyncMutex::new(()),
            next_generation: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            predicate_cache: Mutex::new(None),
        }
    }

    /// Build a resolver from configuration with the shipped HTTP
    /// authority client and the platform's default registry.
    pub fn from_config(
        config: &ResolverConfig,
        session: Arc<dyn SessionStore>,
    ) -> anyhow::Result<Self> {
        let authority = Arc::new(HttpAuthorityClient::new(
            &config.authority_base_url,
            config.request_timeout,
        )?);
        let registry = ModuleRegistry::platform_default()?;
        Ok(Self::new(
            authority,
            session,
            registry,
            config.super_admin_allow_list.clone(),
        ))
    }

    /// Synchronous read of the last published state.
    pub fn state(&self) -> Arc<ResolverState> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Resolve the current session. Safe to call repeatedly; calls
    /// overlapping an in-flight resolution coalesce onto it.
    pub async fn initialize(&self) -> Arc<ResolverState> {
        self.resolve().await
    }

    /// Explicit retry after a failure or a known permission change.
    /// Identical semantics to [`initialize`](Self::initialize).
    pub async fn refresh(&self) -> Arc<ResolverState> {
        self.resolve().await
    }

    /// End the owning session. Any in-flight fetch result is
    /// discarded on arrival instead of being applied to the next
    /// session's state.
    pub fn end_session(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let generation = self.bump_generation();
        self.publish(ResolverState::deny_all(generation, None));
    }

    pub fn is_super_admin(&self) -> bool {
        self.state().is_super_admin()
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.state().has_capability(capability)
    }

    pub fn has_module(&self, flag: &str) -> bool {
        self.state().has_module(flag)
    }

    pub fn quota_remaining(&self, role: Role, current_count: u64) -> Option<u64> {
        QuotaEvaluator::new(self.state().quota.clone()).remaining(role, current_count)
    }

    pub fn quota_exceeded(&self, role: Role, current_count: u64) -> bool {
        QuotaEvaluator::new(self.state().quota.clone()).is_exceeded(role, current_count)
    }

    /// Per-module predicates for the current state, rebuilt only when
    /// the state generation changes. Predicates built from a loading
    /// state deny everything and are not cached.
    pub fn predicates(&self) -> PredicateMap {
        let state = self.state();
        let mut cache = self
            .predicate_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !state.loading {
            if let Some((generation, map)) = cache.as_ref() {
                if *generation == state.generation {
                    return map.clone();
                }
            }
        }
        let map = build_predicates(&self.registry, Arc::new(state.snapshot.clone()));
        if !state.loading {
            *cache = Some((state.generation, map.clone()));
        }
        map
    }

    async fn resolve(&self) -> Arc<ResolverState> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let entry_generation = self.state().generation;

        // No session: terminal deny-all, no network, no error.
        let Some(token) = self.session.bearer_token() else {
            let generation = self.bump_generation();
            return self.publish(ResolverState::deny_all(generation, None));
        };

        // Cached-identity fast path. A validated super-admin must
        // never be blocked by a transient authority outage; anything
        // that fails validation is erased so it cannot leak into a
        // later fast path.
        if let Some(mut principal) = self.session.cached_principal() {
            let tampered = principal.sanitize(&self.allow_list);
            if tampered {
                tracing::warn!(
                    principal_id = %principal.id,
                    "cached privileged snapshot failed allow-list check; erasing"
                );
                self.session.clear_cached_principal();
            } else if principal.is_super_admin {
                tracing::debug!(principal_id = %principal.id, "super-admin fast path");
                let generation = self.bump_generation();
                return self.publish(ResolverState::grant_all(
                    generation,
                    principal,
                    &self.registry,
                ));
            }
        }

        let _guard = self.fetch_lock.lock().await;

        // Coalesce: a resolution completed while we waited for the
        // lock, so its published state answers this call too.
        let current = self.state();
        if current.generation > entry_generation || self.epoch.load(Ordering::SeqCst) != epoch {
            return current;
        }

        self.publish(ResolverState::loading(&current));
        let result = self.authority.fetch_access(&token).await;

        // Session ended while the fetch was in flight: discard.
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!("discarding authority response for ended session");
            return self.state();
        }

        let generation = self.bump_generation();
        let next = match result {
            Err(err) => {
                tracing::error!(error = %err, "authority fetch failed; resolving deny-all");
                ResolverState::deny_all(generation, Some(err.into()))
            }
            Ok(payload) => self.state_from_payload(generation, payload),
        };
        self.publish(next)
    }

    fn state_from_payload(&self, generation: u64, payload: AccessPayload) -> ResolverState {
        if !payload.success {
            return ResolverState::deny_all(
                generation,
                Some(ResolveFailure::AuthorityUnavailable(
                    "authority reported failure".to_string(),
                )),
            );
        }
        let Some(user) = payload.user else {
            return ResolverState::deny_all(
                generation,
                Some(ResolveFailure::MalformedPayload(
                    "missing user in payload".to_string(),
                )),
            );
        };
        let role = match Role::from_str(&user.role) {
            Ok(role) => role,
            Err(err) => {
                return ResolverState::deny_all(
                    generation,
                    Some(ResolveFailure::MalformedPayload(err.to_string())),
                );
            }
        };
        let mut principal = Principal::new(user.id, user.email, role);
        principal.sanitize(&self.allow_list);

        // A privileged role always implies full access, independent
        // of payload completeness.
        if role.is_privileged() {
            return ResolverState::grant_all(generation, principal, &self.registry);
        }
        ResolverState::resolved(
            generation,
            principal,
            PermissionSet::from_map(payload.permissions),
            ModuleFeatureMap::from_map(payload.dashboard_features),
            payload.quota.unwrap_or_default(),
        )
    }

    fn bump_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, next: ResolverState) -> Arc<ResolverState> {
        let next = Arc::new(next);
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);
        next
    }
}
