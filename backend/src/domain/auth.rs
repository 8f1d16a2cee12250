//! Authentication primitives: passwords and login credentials.
//!
//! Inbound payloads are parsed into these types before a handler talks to a
//! port, so services never see unvalidated secrets.

use std::fmt;

use zeroize::Zeroizing;

use super::{Email, UserValidationError};

/// Validation failures for login payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or malformed.
    #[error("email must look like name@domain")]
    InvalidEmail,
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

impl From<UserValidationError> for LoginValidationError {
    fn from(_: UserValidationError) -> Self {
        Self::InvalidEmail
    }
}

/// Plain-text password held in zeroizing memory until hashed.
///
/// Whitespace is preserved so comparisons are never surprising.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a non-empty password.
    pub fn new(value: &str) -> Result<Self, LoginValidationError> {
        if value.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(value.to_owned())))
    }

    /// Borrow the secret for hashing or verification.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Stored password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a PHC string produced by a hasher or read from storage.
    #[must_use]
    pub const fn from_phc(value: String) -> Self {
        Self(value)
    }

    /// The PHC string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use loadboard::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("admin@workflow.com", "admin123")
///     .expect("valid credentials");
/// assert_eq!(creds.email().as_ref(), "admin@workflow.com");
/// ```
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: Email,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = Email::new(email)?;
        let password = Password::new(password)?;
        Ok(Self { email, password })
    }

    /// Normalised email used for the user lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "secret", LoginValidationError::InvalidEmail)]
    #[case("not-an-email", "secret", LoginValidationError::InvalidEmail)]
    #[case("ada@example.com", "", LoginValidationError::EmptyPassword)]
    fn rejects_invalid_parts(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password).expect_err("invalid");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", " pass ").expect("valid");
        assert_eq!(creds.password().expose(), " pass ");
    }

    #[rstest]
    fn debug_output_hides_the_password() {
        let password = Password::new("hunter2").expect("valid");
        assert!(!format!("{password:?}").contains("hunter2"));
    }
}
