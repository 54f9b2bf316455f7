//! Account email addresses.

use serde::{Deserialize, Serialize};

/// Why a registration email was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email address is required")]
    Missing,
    #[error("email address is longer than {0} characters")]
    Overlong(usize),
    #[error("email address must look like name@domain")]
    Malformed,
}

/// An email address as accepted by the registration endpoint.
///
/// Parsing trims surrounding whitespace and checks the basic
/// `local@domain` shape. Values deserialized from API responses are
/// trusted as-is.
///
/// ```
/// use jhytermax_core::Email;
///
/// assert!(Email::parse("  buyer@jhytermax.ng ").is_ok());
/// assert!(Email::parse("buyer").is_err());
/// assert!(Email::parse("a@b@c").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LEN: usize = 254;

    /// Validate user input.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] for blank, overlong or malformed input.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let candidate = input.trim();
        if candidate.is_empty() {
            return Err(EmailError::Missing);
        }
        if candidate.len() > Self::MAX_LEN {
            return Err(EmailError::Overlong(Self::MAX_LEN));
        }

        let well_formed = !candidate.chars().any(char::is_whitespace)
            && candidate
                .split_once('@')
                .is_some_and(|(local, domain)| {
                    !local.is_empty() && !domain.is_empty() && !domain.contains('@')
                });
        if !well_formed {
            return Err(EmailError::Malformed);
        }
        Ok(Self(candidate.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
