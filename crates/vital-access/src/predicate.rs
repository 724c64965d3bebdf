//! Dynamic per-module predicate generation.
//!
//! # Purpose and responsibility
//! Turns the module registry plus one access snapshot into a map of
//! zero-argument predicates, one per registered module, all sharing
//! the same rule shape. Hand-written per-module branches invited
//! drift (a module added to the registry but forgotten in an `if`
//! chain); generation guarantees exactly one consistently shaped rule
//! per module.
//!
//! # Key invariants and assumptions
//! - Predicates are pure functions of the captured snapshot; they
//!   never touch shared state and are cheap to call repeatedly.
//! - The generator does not cache. Callers memoize per snapshot
//!   generation if they poll frequently.
use crate::registry::ModuleRegistry;
use crate::types::AccessSnapshot;
use std::collections::HashMap;
use std::sync::Arc;

/// Zero-argument access decision for one module.
pub type AccessPredicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Generated predicates keyed by module key.
#[derive(Clone)]
pub struct PredicateMap {
    entries: HashMap<&'static str, AccessPredicate>,
}

impl PredicateMap {
    pub fn get(&self, module_key: &str) -> Option<&AccessPredicate> {
        self.entries.get(module_key)
    }

    /// Evaluate the predicate for a module key. Unregistered keys are
    /// denied rather than being an error; route guards treat unknown
    /// screens the same as disabled ones.
    pub fn allows(&self, module_key: &str) -> bool {
        self.entries
            .get(module_key)
            .map(|predicate| predicate())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn module_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

/// Build one predicate per registered module against a snapshot.
///
/// The rule for every module is:
/// `super_admin || features[flag] || (capability set && permissions[capability])`.
///
/// # Example
/// ```rust
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use vital_access::{
///     build_predicates, AccessSnapshot, ModuleDescriptor, ModuleFeatureMap, ModuleRegistry,
///     PermissionSet,
/// };
///
/// let registry = ModuleRegistry::new(vec![ModuleDescriptor::new(
///     "dna",
///     "dna_sequencing_module",
/// )])
/// .expect("registry");
/// let mut flags = HashMap::new();
/// flags.insert("dna_sequencing_module".to_string(), true);
/// let snapshot = Arc::new(AccessSnapshot::new(
///     false,
///     PermissionSet::default(),
///     ModuleFeatureMap::from_map(flags),
/// ));
/// let predicates = build_predicates(&registry, snapshot);
/// assert!(predicates.allows("dna"));
/// ```
pub fn build_predicates(registry: &ModuleRegistry, snapshot: Arc<AccessSnapshot>) -> PredicateMap {
    let mut entries: HashMap<&'static str, AccessPredicate> =
        HashMap::with_capacity(registry.len());
    for descriptor in registry.descriptors() {
        let snapshot = Arc::clone(&snapshot);
        let flag = descriptor.feature_flag;
        let capability = descriptor.required_capability;
        let predicate: AccessPredicate = Arc::new(move || {
            if snapshot.is_super_admin {
                return true;
            }
            if snapshot.features.enables(flag) {
                return true;
            }
            capability
                .map(|capability| snapshot.permissions.allows(capability))
                .unwrap_or(false)
        });
        entries.insert(descriptor.module_key, predicate);
    }
    PredicateMap { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModuleDescriptor;
    use crate::types::{ModuleFeatureMap, PermissionSet, CAP_MANAGE_USERS};
    use std::collections::HashMap;

    fn registry() -> ModuleRegistry {
        ModuleRegistry::new(vec![
            ModuleDescriptor::new("dna", "dna_sequencing_module"),
            ModuleDescriptor::new("telemedicine", "telemedicine_module"),
            ModuleDescriptor::with_capability("user_admin", "user_admin_section", CAP_MANAGE_USERS),
        ])
        .expect("registry")
    }

    fn feature_map(flag: &str, enabled: bool) -> ModuleFeatureMap {
        let mut flags = HashMap::new();
        flags.insert(flag.to_string(), enabled);
        ModuleFeatureMap::from_map(flags)
    }

    #[test]
    fn deny_by_default_with_empty_maps() {
        let predicates = build_predicates(&registry(), Arc::new(AccessSnapshot::deny_all()));
        for key in ["dna", "telemedicine", "user_admin"] {
            assert!(!predicates.allows(key), "{key} should be denied");
        }
    }

    #[test]
    fn super_admin_grants_everything_regardless_of_maps() {
        let snapshot = Arc::new(AccessSnapshot::new(
            true,
            PermissionSet::default(),
            ModuleFeatureMap::default(),
        ));
        let predicates = build_predicates(&registry(), snapshot);
        for key in ["dna", "telemedicine", "user_admin"] {
            assert!(predicates.allows(key), "{key} should be granted");
        }
    }

    #[test]
    fn feature_flag_controls_module() {
        let enabled = Arc::new(AccessSnapshot::new(
            false,
            PermissionSet::default(),
            feature_map("dna_sequencing_module", true),
        ));
        assert!(build_predicates(&registry(), enabled).allows("dna"));

        let disabled = Arc::new(AccessSnapshot::new(
            false,
            PermissionSet::default(),
            feature_map("dna_sequencing_module", false),
        ));
        assert!(!build_predicates(&registry(), disabled).allows("dna"));
    }

    #[test]
    fn required_capability_opens_admin_section_without_flag() {
        let mut grants = HashMap::new();
        grants.insert(CAP_MANAGE_USERS.to_string(), true);
        let snapshot = Arc::new(AccessSnapshot::new(
            false,
            PermissionSet::from_map(grants),
            ModuleFeatureMap::default(),
        ));
        let predicates = build_predicates(&registry(), snapshot);
        assert!(predicates.allows("user_admin"));
        // Capability on one section never leaks into plain modules.
        assert!(!predicates.allows("dna"));
    }

    #[test]
    fn one_entry_per_descriptor() {
        let registry = registry();
        let predicates = build_predicates(&registry, Arc::new(AccessSnapshot::deny_all()));
        assert_eq!(predicates.len(), registry.len());
        for descriptor in registry.descriptors() {
            assert!(predicates.get(descriptor.module_key).is_some());
        }
    }

    #[test]
    fn unregistered_key_is_denied() {
        let predicates = build_predicates(&registry(), Arc::new(AccessSnapshot::deny_all()));
        assert!(!predicates.allows("cafeteria"));
        assert!(predicates.get("cafeteria").is_none());
    }

    #[test]
    fn predicates_are_stable_across_calls() {
        let snapshot = Arc::new(AccessSnapshot::new(
            false,
            PermissionSet::default(),
            feature_map("telemedicine_module", true),
        ));
        let predicates = build_predicates(&registry(), snapshot);
        let first = predicates.allows("telemedicine");
        let second = predicates.allows("telemedicine");
        assert_eq!(first, second);
        assert!(first);
    }
}
