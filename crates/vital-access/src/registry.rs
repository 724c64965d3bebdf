//! Module registry: the single source of truth for what modules exist.
//!
//! # Purpose and responsibility
//! Holds the ordered, hand-maintained list of module descriptors the
//! predicate generator consumes. Adding a module to the dashboard is a
//! registry edit here, not a logic change anywhere else.
//!
//! # Key invariants and assumptions
//! - `module_key` and `feature_flag` are each unique across the
//!   registry; duplicates are a configuration error and fail fast.
//! - Descriptors are static, code-owned data, never derived from
//!   network payloads.
use crate::errors::{AccessError, AccessResult};
use crate::types::{
    CAP_MANAGE_BILLING, CAP_MANAGE_CONTRACTS, CAP_MANAGE_DEPARTMENTS, CAP_MANAGE_USERS,
    CAP_VIEW_AUDIT_LOGS, CAP_VIEW_REPORTS,
};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub module_key: &'static str,
    pub feature_flag: &'static str,
    /// Capability that also unlocks the module, independent of its
    /// feature flag. Used by admin sections where a grant implies the
    /// screen must be reachable.
    pub required_capability: Option<&'static str>,
}

impl ModuleDescriptor {
    pub const fn new(module_key: &'static str, feature_flag: &'static str) -> Self {
        Self {
            module_key,
            feature_flag,
            required_capability: None,
        }
    }

    pub const fn with_capability(
        module_key: &'static str,
        feature_flag: &'static str,
        capability: &'static str,
    ) -> Self {
        Self {
            module_key,
            feature_flag,
            required_capability: Some(capability),
        }
    }
}

/// Clinical modules of the platform. Append-only; order is the menu
/// order and is part of the registry contract.
const CLINICAL_MODULES: &[ModuleDescriptor] = &[
    ModuleDescriptor::new("appointments", "appointments_module"),
    ModuleDescriptor::new("telemedicine", "telemedicine_module"),
    ModuleDescriptor::new("lab_results", "lab_results_module"),
    ModuleDescriptor::new("radiology", "radiology_module"),
    ModuleDescriptor::new("pharmacy", "pharmacy_module"),
    ModuleDescriptor::new("pathology", "pathology_module"),
    ModuleDescriptor::new("dna_sequencing", "dna_sequencing_module"),
    ModuleDescriptor::new("genetics_counseling", "genetics_counseling_module"),
    ModuleDescriptor::new("dialysis", "dialysis_module"),
    ModuleDescriptor::new("inpatient", "inpatient_module"),
    ModuleDescriptor::new("emergency", "emergency_module"),
    ModuleDescriptor::new("physiotherapy", "physiotherapy_module"),
    ModuleDescriptor::new("vaccination", "vaccination_module"),
];

/// Administrative sections. These also open when the matching
/// capability is granted, so a department admin without the plan flag
/// can still reach the screens their grants imply.
const ADMIN_SECTIONS: &[ModuleDescriptor] = &[
    ModuleDescriptor::with_capability("user_admin", "user_admin_section", CAP_MANAGE_USERS),
    ModuleDescriptor::with_capability(
        "department_admin",
        "department_admin_section",
        CAP_MANAGE_DEPARTMENTS,
    ),
    ModuleDescriptor::with_capability("billing_admin", "billing_admin_section", CAP_MANAGE_BILLING),
    ModuleDescriptor::with_capability(
        "contract_admin",
        "contract_admin_section",
        CAP_MANAGE_CONTRACTS,
    ),
    ModuleDescriptor::with_capability("reports", "reports_section", CAP_VIEW_REPORTS),
    ModuleDescriptor::with_capability("audit_logs", "audit_logs_section", CAP_VIEW_AUDIT_LOGS),
];

/// Ordered, validated collection of module descriptors.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    descriptors: Vec<ModuleDescriptor>,
}

impl ModuleRegistry {
    /// Validate and build a registry from descriptors.
    ///
    /// # Errors
    /// - [`AccessError::DuplicateModuleKey`] / [`AccessError::DuplicateFeatureFlag`]
    ///   when two descriptors collide; duplicates silently shadowing
    ///   each other is exactly the drift this type exists to prevent.
    /// - [`AccessError::EmptyDescriptorField`] for blank keys or flags.
    pub fn new(descriptors: Vec<ModuleDescriptor>) -> AccessResult<Self> {
        let mut keys = HashSet::new();
        let mut flags = HashSet::new();
        for descriptor in &descriptors {
            if descriptor.module_key.is_empty() || descriptor.feature_flag.is_empty() {
                return Err(AccessError::EmptyDescriptorField(
                    descriptor.module_key.to_string(),
                ));
            }
            if !keys.insert(descriptor.module_key) {
                return Err(AccessError::DuplicateModuleKey(
                    descriptor.module_key.to_string(),
                ));
            }
            if !flags.insert(descriptor.feature_flag) {
                return Err(AccessError::DuplicateFeatureFlag(
                    descriptor.feature_flag.to_string(),
                ));
            }
        }
        Ok(Self { descriptors })
    }

    /// The platform's full registry: clinical modules followed by
    /// administrative sections.
    pub fn platform_default() -> AccessResult<Self> {
        let mut descriptors = Vec::with_capacity(CLINICAL_MODULES.len() + ADMIN_SECTIONS.len());
        descriptors.extend_from_slice(CLINICAL_MODULES);
        descriptors.extend_from_slice(ADMIN_SECTIONS);
        Self::new(descriptors)
    }

    pub fn descriptors(&self) -> &[ModuleDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// All feature flags in registry order, used to build the
    /// grant-all feature map.
    pub fn feature_flags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.iter().map(|descriptor| descriptor.feature_flag)
    }
}
