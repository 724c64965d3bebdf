//! Closed role enumeration for dashboard principals.
//!
//! # Purpose
//! Roles are a fixed vocabulary; anything outside it coming from the
//! authority payload is a malformed response, not a new role.
use crate::errors::AccessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Doctor,
    Nurse,
    LabTech,
    Staff,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::LabTech => "lab_tech",
            Role::Staff => "staff",
            Role::Viewer => "viewer",
        }
    }

    /// Whether this role is the privileged one eligible for the
    /// grant-all override. Eligibility is necessary, not sufficient;
    /// the identity allow-list check still applies to cached state.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "super_admin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "nurse" => Ok(Role::Nurse),
            "lab_tech" => Ok(Role::LabTech),
            "staff" => Ok(Role::Staff),
            "viewer" => Ok(Role::Viewer),
            other => Err(AccessError::UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        for role in [
            Role::SuperAdmin,
            Role::Admin,
            Role::Doctor,
            Role::Nurse,
            Role::LabTech,
            Role::Staff,
            Role::Viewer,
        ] {
            let parsed = Role::from_str(role.as_str()).expect("parse");
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = Role::from_str("root").expect_err("invalid");
        assert!(matches!(err, AccessError::UnknownRole(s) if s == "root"));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::SuperAdmin).expect("serialize");
        assert_eq!(json, "\"super_admin\"");
        let parsed: Role = serde_json::from_str("\"lab_tech\"").expect("deserialize");
        assert_eq!(parsed, Role::LabTech);
    }

    #[test]
    fn only_super_admin_is_privileged() {
        assert!(Role::SuperAdmin.is_privileged());
        assert!(!Role::Admin.is_privileged());
        assert!(!Role::Viewer.is_privileged());
    }
}
