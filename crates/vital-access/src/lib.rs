//! Vital access-decision primitives shared by the resolver and consumers.
//!
//! # Purpose
//! Centralizes the access model for the Vital admin dashboard: roles,
//! principal sanitization, capability and feature maps, the module
//! registry, dynamic predicate generation, and quota evaluation.
//!
//! # How it fits
//! The resolver crate merges session and authority data into an
//! [`AccessSnapshot`], then uses this crate to derive every per-module
//! access decision. Consumers (route guards, widgets) only ever see
//! generated predicates and accessors, never the raw maps.
//!
//! # Key invariants
//! - `Principal::is_super_admin` is honored only when the role is
//!   `super_admin` and the email passes the configured allow-list.
//! - Every registered module has exactly one generated predicate; the
//!   registry rejects duplicate keys at load time.
//!
//! # Examples
//! ```rust
//! use vital_access::{ModuleRegistry, AccessSnapshot, build_predicates};
//! use std::sync::Arc;
//!
//! let registry = ModuleRegistry::platform_default().expect("registry");
//! let predicates = build_predicates(&registry, Arc::new(AccessSnapshot::deny_all()));
//! assert!(!predicates.allows("dna_sequencing"));
//! ```
//!
//! # Common pitfalls
//! - Trusting a cached `is_super_admin` boolean without calling
//!   [`Principal::sanitize`]; a bare flag is never sufficient.
//! - Reading feature maps directly instead of through predicates,
//!   which bypasses the super-admin override.

mod errors;
mod predicate;
mod principal;
mod quota;
mod registry;
mod role;
mod types;

pub use errors::{AccessError, AccessResult};
pub use predicate::{build_predicates, AccessPredicate, PredicateMap};
pub use principal::{Principal, SuperAdminAllowList};
pub use quota::{Quota, QuotaEvaluator, ResetPeriod};
pub use registry::{ModuleDescriptor, ModuleRegistry};
pub use role::Role;
pub use types::{
    AccessSnapshot, ModuleFeatureMap, PermissionSet, CAP_EXPORT_DATA, CAP_MANAGE_APPOINTMENTS,
    CAP_MANAGE_BILLING, CAP_MANAGE_CONTRACTS, CAP_MANAGE_DEPARTMENTS, CAP_MANAGE_USERS,
    CAP_VIEW_AUDIT_LOGS, CAP_VIEW_REPORTS, KNOWN_CAPABILITIES,
};
