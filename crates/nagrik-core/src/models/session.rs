//! Identity and role types consumed from the identity provider

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Role attached to an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Citizen,
    Admin,
    DepartmentStaff,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Admin => "admin",
            Self::DepartmentStaff => "department_staff",
        }
    }

    /// Whether this role may use the administrative console
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::DepartmentStaff)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "citizen" => Ok(Self::Citizen),
            "admin" => Ok(Self::Admin),
            "department_staff" => Ok(Self::DepartmentStaff),
            other => Err(Error::InvalidInput(format!("unknown role: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// The signed-in user as reported by the identity provider
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: AuthUser,
    /// Role may be unknown while the provider is still resolving it
    pub role: Option<Role>,
    pub access_token: Option<String>,
}

impl Session {
    #[must_use]
    pub const fn new(user: AuthUser, role: Option<Role>) -> Self {
        Self {
            user,
            role,
            access_token: None,
        }
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("user", &self.user)
            .field("role", &self.role)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_storage_and_dashed_forms() {
        assert_eq!(
            "department-staff".parse::<Role>().unwrap(),
            Role::DepartmentStaff
        );
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("mayor".parse::<Role>().is_err());
    }

    #[test]
    fn session_debug_redacts_token() {
        let session = Session::new(
            AuthUser {
                id: "u1".into(),
                email: None,
            },
            Some(Role::Citizen),
        )
        .with_access_token("secret");
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
