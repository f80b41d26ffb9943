//! Routing policy — maps (role, path) to an optional forced navigation.
//!
//! Pure: no session mutation, no I/O. The guard calls it after every state
//! change and the gateway calls it on every navigation.

use super::model::Role;

pub const DEFAULT_ENTRY_PATH: &str = "/";
pub const DEFAULT_PUBLIC_PREFIX: &str = "/public";
pub const DEFAULT_PATIENT_ROOT: &str = "/patient";
pub const DEFAULT_STAFF_ROOT: &str = "/hospital";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPolicy {
    /// Unauthenticated landing page (the login screen).
    pub entry_path: String,
    /// Subtree reachable without a session.
    pub public_prefix: String,
    pub patient_root: String,
    pub staff_root: String,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            entry_path: DEFAULT_ENTRY_PATH.to_owned(),
            public_prefix: DEFAULT_PUBLIC_PREFIX.to_owned(),
            patient_root: DEFAULT_PATIENT_ROOT.to_owned(),
            staff_root: DEFAULT_STAFF_ROOT.to_owned(),
        }
    }
}

impl RoutingPolicy {
    /// Portal root owned by `role`.
    #[must_use]
    pub fn portal_root(&self, role: Role) -> &str {
        match role {
            Role::Patient => &self.patient_root,
            Role::HospitalStaff => &self.staff_root,
        }
    }

    /// Portal root of the role that is not `role`.
    fn foreign_root(&self, role: Role) -> &str {
        match role {
            Role::Patient => &self.staff_root,
            Role::HospitalStaff => &self.patient_root,
        }
    }

    /// Decide where navigation to `path` must be redirected, if anywhere.
    ///
    /// - unauthenticated outside the entry point and public prefix: entry point
    /// - authenticated inside the other role's portal: own portal root
    /// - authenticated on the entry point: own portal root
    #[must_use]
    pub fn decide(&self, role: Option<Role>, path: &str) -> Option<String> {
        let path = normalize_path(path);
        let on_entry = path == normalize_path(&self.entry_path);

        match role {
            None => {
                if on_entry || within(path, &self.public_prefix) {
                    None
                } else {
                    Some(self.entry_path.clone())
                }
            }
            Some(role) => {
                if on_entry || within(path, self.foreign_root(role)) {
                    Some(self.portal_root(role).to_owned())
                } else {
                    None
                }
            }
        }
    }
}

/// Strip query, fragment, and trailing slashes. An empty result is `/`.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// True if `path` is `prefix` itself or lies beneath it.
#[must_use]
pub fn within(path: &str, prefix: &str) -> bool {
    let path = normalize_path(path);
    let prefix = normalize_path(prefix);
    if prefix == "/" {
        return true;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
#[path = "routing_test.rs"]
mod tests;
