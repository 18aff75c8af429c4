use std::fmt;

use unicode_normalization::UnicodeNormalization;

use crate::errors::domain::{DomainError, ValidationKind};
use crate::logging::Redacted;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Trim, NFKC-normalize and lowercase so visually equal addresses compare equal.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

fn validate_email(raw: &str) -> Result<String, DomainError> {
    let email = normalize_email(raw);
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(DomainError::validation(
            ValidationKind::InvalidEmail,
            "Enter a valid email address.",
        ));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(
            ValidationKind::WeakPassword,
            format!("Password should be at least {MIN_PASSWORD_LEN} characters."),
        ));
    }
    Ok(())
}

/// Email and password that passed boundary validation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Result<Self, DomainError> {
        let email = validate_email(email)?;
        validate_password(password)?;
        Ok(Self {
            email,
            password: password.to_string(),
        })
    }

    /// Normalized email only, for password-recovery requests.
    pub fn email_only(email: &str) -> Result<String, DomainError> {
        validate_email(email)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &Redacted(&self.email))
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let c = Credentials::new("  Player@Banana.TEST ", "secret1").unwrap();
        assert_eq!(c.email(), "player@banana.test");
        // Fullwidth letters fold under NFKC.
        assert_eq!(normalize_email("ＡＢＣ@x.io"), "abc@x.io");
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in ["", "plain", "@x.io", "a@", "a@b", "a@@b.io", "a b@c.io", "a@.io"] {
            let err = Credentials::new(bad, "secret1").unwrap_err();
            assert!(
                matches!(err, DomainError::Validation(ValidationKind::InvalidEmail, _)),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn short_password_is_weak() {
        let err = Credentials::new("a@b.io", "12345").unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::WeakPassword, _)
        ));
        assert!(Credentials::new("a@b.io", "123456").is_ok());
    }

    #[test]
    fn debug_hides_password() {
        let c = Credentials::new("kim@banana.test", "hunter22").unwrap();
        let shown = format!("{c:?}");
        assert!(!shown.contains("hunter22"));
        assert!(!shown.contains("kim@"));
    }
}
