//! Per-role creation quota evaluation.
//!
//! # Purpose
//! Compares usage counters against configured per-role ceilings. The
//! evaluator is stateless and clockless: `reset_period` is metadata
//! for the external scheduler that actually resets counters, never
//! consulted here.
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPeriod {
    Daily,
    Weekly,
    Monthly,
    Never,
}

impl Default for ResetPeriod {
    fn default() -> Self {
        ResetPeriod::Never
    }
}

/// Quota configuration as delivered by the authority payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub reset_period: ResetPeriod,
    #[serde(default)]
    pub per_role_max: HashMap<Role, u64>,
}

impl Quota {
    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Stateless comparator over a quota configuration.
#[derive(Debug, Clone)]
pub struct QuotaEvaluator {
    quota: Quota,
}

impl QuotaEvaluator {
    pub fn new(quota: Quota) -> Self {
        Self { quota }
    }

    pub fn quota(&self) -> &Quota {
        &self.quota
    }

    /// Remaining headroom for a role given its current usage count.
    ///
    /// `None` means unlimited: quota disabled entirely, or no ceiling
    /// configured for this role. Never returns a negative value; an
    /// over-consumed counter clamps to zero.
    pub fn remaining(&self, role: Role, current_count: u64) -> Option<u64> {
        if !self.quota.enabled {
            return None;
        }
        let max = self.quota.per_role_max.get(&role).copied()?;
        Some(max.saturating_sub(current_count))
    }

    /// `true` exactly when a ceiling exists and no headroom is left.
    pub fn is_exceeded(&self, role: Role, current_count: u64) -> bool {
        matches!(self.remaining(role, current_count), Some(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota() -> Quota {
        let mut per_role_max = HashMap::new();
        per_role_max.insert(Role::Admin, 10);
        per_role_max.insert(Role::Doctor, 3);
        Quota {
            enabled: true,
            reset_period: ResetPeriod::Monthly,
            per_role_max,
        }
    }

    #[test]
    fn disabled_quota_is_unlimited() {
        let evaluator = QuotaEvaluator::new(Quota::disabled());
        assert_eq!(evaluator.remaining(Role::Admin, 1_000_000), None);
        assert!(!evaluator.is_exceeded(Role::Admin, 1_000_000));
    }

    #[test]
    fn role_without_ceiling_is_unlimited() {
        let evaluator = QuotaEvaluator::new(quota());
        assert_eq!(evaluator.remaining(Role::Viewer, 500), None);
        assert!(!evaluator.is_exceeded(Role::Viewer, 500));
    }

    #[test]
    fn remaining_counts_down() {
        let evaluator = QuotaEvaluator::new(quota());
        assert_eq!(evaluator.remaining(Role::Doctor, 0), Some(3));
        assert_eq!(evaluator.remaining(Role::Doctor, 2), Some(1));
        assert_eq!(evaluator.remaining(Role::Doctor, 3), Some(0));
    }

    #[test]
    fn remaining_clamps_at_zero() {
        let evaluator = QuotaEvaluator::new(quota());
        assert_eq!(evaluator.remaining(Role::Doctor, 99), Some(0));
    }

    #[test]
    fn exceeded_exactly_when_remaining_is_zero() {
        let evaluator = QuotaEvaluator::new(quota());
        assert!(!evaluator.is_exceeded(Role::Admin, 9));
        assert!(evaluator.is_exceeded(Role::Admin, 10));
        assert!(evaluator.is_exceeded(Role::Admin, 11));
    }

    #[test]
    fn quota_payload_round_trip() {
        let json = r#"{"enabled":true,"reset_period":"monthly","per_role_max":{"doctor":3}}"#;
        let parsed: Quota = serde_json::from_str(json).expect("deserialize");
        assert!(parsed.enabled);
        assert_eq!(parsed.reset_period, ResetPeriod::Monthly);
        assert_eq!(parsed.per_role_max.get(&Role::Doctor), Some(&3));
    }
}
