//! Username and password types for login and registration.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating credentials.
///
/// The `Display` text is shown to users as-is.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The username is empty.
    #[error("Username is a required field")]
    EmptyUsername,
    /// The username is too short for registration.
    #[error("Username must be at least {min} characters")]
    UsernameTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The password is empty.
    #[error("Password is a required field")]
    EmptyPassword,
    /// The password is too short for registration.
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The confirmation does not match the password.
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// A QKart username.
///
/// ## Constraints
///
/// - Must not be empty (after trimming)
/// - At least 6 characters when registering
///
/// ## Examples
///
/// ```
/// use qkart_core::Username;
///
/// assert!(Username::parse("crio.do").is_ok());
/// assert!(Username::parse("  ").is_err());
/// assert!(Username::parse_new("abc").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum length for a newly registered username.
    pub const MIN_LENGTH: usize = 6;

    /// Parse a username for login (presence only).
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::EmptyUsername`] if the input is blank.
    pub fn parse(s: &str) -> Result<Self, CredentialError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::EmptyUsername);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parse a username for registration (presence and length).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank or shorter than [`Self::MIN_LENGTH`].
    pub fn parse_new(s: &str) -> Result<Self, CredentialError> {
        let username = Self::parse(s)?;
        if username.0.chars().count() < Self::MIN_LENGTH {
            return Err(CredentialError::UsernameTooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(username)
    }

    /// Get the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A password as typed by the user.
///
/// `Debug` output is redacted. Passwords are never trimmed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Minimum length for a newly registered password.
    pub const MIN_LENGTH: usize = 6;

    /// Parse a password for login (presence only).
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::EmptyPassword`] if the input is empty.
    pub fn parse(s: &str) -> Result<Self, CredentialError> {
        if s.is_empty() {
            return Err(CredentialError::EmptyPassword);
        }
        Ok(Self(s.to_string()))
    }

    /// Parse a password and its confirmation for registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the password is empty, shorter than
    /// [`Self::MIN_LENGTH`], or differs from `confirm`.
    pub fn parse_new(s: &str, confirm: &str) -> Result<Self, CredentialError> {
        let password = Self::parse(s)?;
        if password.0.chars().count() < Self::MIN_LENGTH {
            return Err(CredentialError::PasswordTooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if s != confirm {
            return Err(CredentialError::PasswordMismatch);
        }
        Ok(password)
    }

    /// Expose the raw password for sending to the auth endpoint.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}
