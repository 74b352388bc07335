//! JWT claims and role definitions.

use serde::{Deserialize, Serialize};

/// Caller roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May manage the employee roster
    Admin,
    /// May record transactions and read reports
    #[default]
    Employee,
}

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (employee or operator ID)
    pub sub: String,
    /// Display name of the subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Caller's role
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create new claims for a subject.
    pub fn new(
        subject: impl Into<String>,
        role: Role,
        issuer: impl Into<String>,
        expires_in_secs: i64,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: subject.into(),
            name: None,
            role,
            exp: now + expires_in_secs,
            iat: now,
            iss: issuer.into(),
        }
    }

    /// Attach a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check if the claims have expired.
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() > self.exp
    }

    /// Check if the caller has the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
