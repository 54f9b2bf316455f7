//! Account data exchanged with the auth endpoints.

use jhytermax_core::{Email, Role, UserId};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// The signed-in user, fetched fresh from `/api/auth/me/`.
///
/// Never cached: every access check goes back through
/// [`SessionClient::ensure_profile`](super::SessionClient::ensure_profile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub role: Role,
    #[serde(default)]
    pub is_staff: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
}

impl UserProfile {
    /// Admin access is granted by the admin role or either elevation flag.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
            || self.is_staff.unwrap_or(false)
            || self.is_superuser.unwrap_or(false)
    }
}

/// Sign-up form for `/api/auth/register/`.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: Email,
    pub password: SecretString,
    pub role: Role,
}

/// Confirmation returned by a successful registration.
///
/// The API echoes the new account; fields it leaves out stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegisteredUser {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}
