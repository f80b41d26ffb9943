//! Session data model.
//!
//! DESIGN
//! ======
//! The role tag is carried by the `Profile` variant itself, so a session can
//! never hold fields from one role while claiming the other. The serialized
//! form is flat (`{"id", "email", "name", "avatar", "role", ...role fields}`)
//! and is the exact record written to durable storage.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// ROLE
// =============================================================================

/// Account category. Determines which portal subtree a session may access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Patient,
    HospitalStaff,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::HospitalStaff => "hospital-staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PROFILE
// =============================================================================

/// Role-specific profile fields, tagged by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum Profile {
    Patient {
        zip_code: String,
    },
    HospitalStaff {
        hospital_name: String,
        staff_role: String,
        zip_code: String,
    },
}

impl Profile {
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Patient { .. } => Role::Patient,
            Self::HospitalStaff { .. } => Role::HospitalStaff,
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Authenticated identity. Never carries the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque account identifier.
    pub id: String,
    pub email: String,
    /// Display name used in greetings.
    pub name: String,
    /// Avatar image reference, if the account has one.
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub profile: Profile,
}

impl Session {
    #[must_use]
    pub fn role(&self) -> Role {
        self.profile.role()
    }
}

/// Either no one is signed in, or exactly one session is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated(Session),
}

impl SessionState {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Unauthenticated => None,
            Self::Authenticated(session) => Some(session),
        }
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.session().map(Session::role)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
