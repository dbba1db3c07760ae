//! Identity provider seam and role gating.
//!
//! Nagrik does not implement authentication itself. Hosts plug an external
//! identity service in through [`IdentityProvider`] and gate areas of the
//! app with [`authorize`].

use std::future::Future;

use thiserror::Error;

use crate::models::{Role, Session};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Identity provider is not configured")]
    NotConfigured,
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("Identity provider error: {0}")]
    Provider(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    ConfirmationRequired,
}

/// Capability surface of the external identity service.
pub trait IdentityProvider: Send + Sync {
    fn current_session(&self) -> impl Future<Output = AuthResult<Option<Session>>> + Send;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = AuthResult<Session>> + Send;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = AuthResult<SignUpOutcome>> + Send;

    fn sign_out(&self) -> impl Future<Output = AuthResult<()>> + Send;

    fn reset_password(&self, email: &str) -> impl Future<Output = AuthResult<()>> + Send;
}

/// Reject blank credentials before they reach the provider.
pub fn validate_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() {
        return Err(AuthError::InvalidCredentials("Email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(AuthError::InvalidCredentials(
            "Password is required".to_string(),
        ));
    }
    Ok(())
}

/// Part of the app a request or screen belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    /// Landing and sign-in pages.
    Public,
    /// Reporting, tracking and the offline queue.
    Citizen,
    /// Staff console.
    Admin,
}

impl Area {
    const fn is_role_restricted(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Outcome of gating an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Not signed in; send the user to sign-in.
    RedirectToAuth,
    /// Signed in without a permitted role; send the user home.
    RedirectHome,
}

impl Access {
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Decide whether `session` may enter `area`.
///
/// This is deliberately stricter than a route guard that waits for the
/// role to load: a session whose role is still unknown is sent home from
/// role-restricted areas instead of being let through.
pub fn authorize(session: Option<&Session>, area: Area) -> Access {
    if area == Area::Public {
        return Access::Granted;
    }
    let Some(session) = session else {
        return Access::RedirectToAuth;
    };
    if !area.is_role_restricted() {
        return Access::Granted;
    }
    match session.role {
        Some(role) if role.is_staff() => Access::Granted,
        _ => Access::RedirectHome,
    }
}

/// Ask the provider for the current session and gate `area` with it.
pub async fn gate<P: IdentityProvider>(provider: &P, area: Area) -> AuthResult<Access> {
    let session = provider.current_session().await?;
    let access = authorize(session.as_ref(), area);
    if !access.is_granted() {
        tracing::debug!(?area, ?access, "Access denied");
    }
    Ok(access)
}
