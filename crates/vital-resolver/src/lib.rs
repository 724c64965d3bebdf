//! Vital permission resolver: session-aware access resolution.
//!
//! # Purpose
//! Establishes the principal's identity and role, merges locally
//! cached state with the authoritative remote permission payload, and
//! exposes stable per-module and per-capability access decisions with
//! a deny-all failure policy.
//!
//! # How it fits
//! Sits between the session/transport layer (which owns the bearer
//! token) and the UI consumers (route guards, widgets). Consumers call
//! accessors and generated predicates; only this crate touches the raw
//! authority payload.
//!
//! # Key invariants
//! - Failures of any kind resolve to deny-all; there is no
//!   partial-trust state and stale grants are never silently kept.
//! - At most one authority call is in flight per session; overlapping
//!   resolution calls coalesce.
//! - A cached privileged flag is honored only after the identity
//!   allow-list check, and erased when it fails.
//!
//! # Examples
//! ```rust,no_run
//! use std::sync::Arc;
//! use vital_access::{ModuleRegistry, SuperAdminAllowList};
//! use vital_resolver::{HttpAuthorityClient, InMemorySessionStore, PermissionResolver};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let authority = Arc::new(HttpAuthorityClient::new(
//!     "http://127.0.0.1:8700",
//!     std::time::Duration::from_secs(5),
//! )?);
//! let session = Arc::new(InMemorySessionStore::with_token("bearer"));
//! let resolver = PermissionResolver::new(
//!     authority,
//!     session,
//!     ModuleRegistry::platform_default()?,
//!     SuperAdminAllowList::new(["root@vital.example"]),
//! );
//! resolver.initialize().await;
//! let can_see_dna = resolver.predicates().allows("dna_sequencing");
//! # let _ = can_see_dna;
//! # Ok(())
//! # }
//! ```
//!
//! # Common pitfalls
//! - Rendering protected content while `state().loading` is true.
//! - Calling the authority directly instead of going through
//!   [`PermissionResolver::refresh`], which bypasses coalescing.

mod authority;
mod config;
mod resolver;
mod session;
mod state;

pub use authority::{
    AccessPayload, AuthorityClient, AuthorityError, AuthorityResult, HttpAuthorityClient,
    PayloadUser,
};
pub use config::ResolverConfig;
pub use resolver::PermissionResolver;
pub use session::{InMemorySessionStore, SessionStore};
pub use state::{ResolveFailure, ResolverState};
