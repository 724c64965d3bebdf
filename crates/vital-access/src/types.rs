//! Capability and feature map types plus the merged access snapshot.
//!
//! # Purpose
//! Wraps the raw boolean maps returned by the authority so callers go
//! through `allows`/`enables` accessors instead of indexing maps, and
//! defines the fixed capability vocabulary.
//!
//! # Key invariants
//! - Absent keys read as `false`; there is no tri-state.
//! - The raw maps are never handed out; the super-admin override can
//!   only be observed through predicates and snapshot accessors.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const CAP_MANAGE_USERS: &str = "can_manage_users";
pub const CAP_MANAGE_DEPARTMENTS: &str = "can_manage_departments";
pub const CAP_MANAGE_APPOINTMENTS: &str = "can_manage_appointments";
pub const CAP_MANAGE_BILLING: &str = "can_manage_billing";
pub const CAP_MANAGE_CONTRACTS: &str = "can_manage_contracts";
pub const CAP_VIEW_REPORTS: &str = "can_view_reports";
pub const CAP_VIEW_AUDIT_LOGS: &str = "can_view_audit_logs";
pub const CAP_EXPORT_DATA: &str = "can_export_data";

/// The fixed administrative capability vocabulary.
pub const KNOWN_CAPABILITIES: &[&str] = &[
    CAP_MANAGE_USERS,
    CAP_MANAGE_DEPARTMENTS,
    CAP_MANAGE_APPOINTMENTS,
    CAP_MANAGE_BILLING,
    CAP_MANAGE_CONTRACTS,
    CAP_VIEW_REPORTS,
    CAP_VIEW_AUDIT_LOGS,
    CAP_EXPORT_DATA,
];

/// Capability name to grant mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    grants: HashMap<String, bool>,
}

impl PermissionSet {
    pub fn from_map(grants: HashMap<String, bool>) -> Self {
        Self { grants }
    }

    /// Grant every known capability. Used by the super-admin
    /// grant-all state so downstream maps are self-consistent.
    pub fn grant_all() -> Self {
        let grants = KNOWN_CAPABILITIES
            .iter()
            .map(|cap| ((*cap).to_string(), true))
            .collect();
        Self { grants }
    }

    pub fn allows(&self, capability: &str) -> bool {
        self.grants.get(capability).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

/// Feature flag to enabled mapping for the principal's tenant/plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleFeatureMap {
    flags: HashMap<String, bool>,
}

impl ModuleFeatureMap {
    pub fn from_map(flags: HashMap<String, bool>) -> Self {
        Self { flags }
    }

    /// Enable every flag named by the registry. Grant-all counterpart
    /// of [`PermissionSet::grant_all`].
    pub fn enable_all(flags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let flags = flags.into_iter().map(|flag| (flag.into(), true)).collect();
        Self { flags }
    }

    pub fn enables(&self, flag: &str) -> bool {
        self.flags.get(flag).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// The merged view the predicate generator evaluates against.
///
/// One snapshot corresponds to exactly one completed resolution;
/// the resolver replaces the whole value, never individual fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessSnapshot {
    pub is_super_admin: bool,
    pub permissions: PermissionSet,
    pub features: ModuleFeatureMap,
}

impl AccessSnapshot {
    /// Terminal deny-all view: no grants, no flags, no override.
    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn new(
        is_super_admin: bool,
        permissions: PermissionSet,
        features: ModuleFeatureMap,
    ) -> Self {
        Self {
            is_super_admin,
            permissions,
            features,
        }
    }

    pub fn allows_capability(&self, capability: &str) -> bool {
        self.is_super_admin || self.permissions.allows(capability)
    }

    pub fn enables_module(&self, flag: &str) -> bool {
        self.is_super_admin || self.features.enables(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_read_false() {
        let permissions = PermissionSet::default();
        let features = ModuleFeatureMap::default();
        assert!(!permissions.allows(CAP_MANAGE_USERS));
        assert!(!features.enables("dna_sequencing_module"));
    }

    #[test]
    fn explicit_false_reads_false() {
        let mut grants = HashMap::new();
        grants.insert(CAP_MANAGE_USERS.to_string(), false);
        let permissions = PermissionSet::from_map(grants);
        assert!(!permissions.allows(CAP_MANAGE_USERS));
    }

    #[test]
    fn grant_all_covers_known_capabilities() {
        let permissions = PermissionSet::grant_all();
        for cap in KNOWN_CAPABILITIES {
            assert!(permissions.allows(cap), "missing grant for {cap}");
        }
    }

    #[test]
    fn snapshot_super_admin_overrides_empty_maps() {
        let snapshot = AccessSnapshot::new(
            true,
            PermissionSet::default(),
            ModuleFeatureMap::default(),
        );
        assert!(snapshot.allows_capability(CAP_MANAGE_BILLING));
        assert!(snapshot.enables_module("anything_at_all"));
    }

    #[test]
    fn deny_all_denies() {
        let snapshot = AccessSnapshot::deny_all();
        assert!(!snapshot.allows_capability(CAP_VIEW_REPORTS));
        assert!(!snapshot.enables_module("telemedicine_module"));
    }

    #[test]
    fn permission_set_serde_is_transparent() {
        let json = "{\"can_manage_users\":true}";
        let permissions: PermissionSet = serde_json::from_str(json).expect("deserialize");
        assert!(permissions.allows(CAP_MANAGE_USERS));
    }
}
