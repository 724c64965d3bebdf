//! Principal identity model and tamper sanitization.
//!
//! # Purpose
//! Defines the authenticated principal and the allow-list check that
//! decides whether a locally cached super-admin flag may be honored.
//!
//! # Security considerations
//! - A boolean alone never grants privilege: the flag must agree with
//!   the role and the email must be allow-listed.
//! - Sanitization corrects tampered state silently; it is not an error
//!   surfaced to the user, only a warn-level log event.
use crate::role::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub is_super_admin: bool,
}

impl Principal {
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
            is_super_admin: false,
        }
    }

    /// Re-derive `is_super_admin` from role and allow-list.
    ///
    /// Returns `true` if the stored flag disagreed with the derived
    /// value, which callers treat as tampered client state.
    pub fn sanitize(&mut self, allow_list: &SuperAdminAllowList) -> bool {
        let derived = self.role.is_privileged() && allow_list.contains(&self.email);
        let tampered = self.is_super_admin != derived && self.is_super_admin;
        if self.is_super_admin != derived {
            self.is_super_admin = derived;
        }
        tampered
    }

    /// Allow-list-validated privileged identity check, usable without
    /// mutating the principal.
    pub fn is_trusted_super_admin(&self, allow_list: &SuperAdminAllowList) -> bool {
        self.role.is_privileged() && allow_list.contains(&self.email)
    }
}

/// Identity allow-list for the super-admin override.
///
/// Matching is case-insensitive on the email; entries are normalized
/// to lowercase at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuperAdminAllowList {
    emails: Vec<String>,
}

impl SuperAdminAllowList {
    pub fn new(emails: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut emails: Vec<String> = emails
            .into_iter()
            .map(|email| email.into().trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect();
        emails.sort();
        emails.dedup();
        Self { emails }
    }

    pub fn contains(&self, email: &str) -> bool {
        let needle = email.trim().to_lowercase();
        self.emails.binary_search(&needle).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}
