//! Claim form validation.

use serde::Deserialize;
use thiserror::Error;

/// Country code prepended to bare 10-digit mobile numbers.
const DEFAULT_COUNTRY_CODE: &str = "91";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Activation code is required")]
    MissingActivationCode,

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),
}

/// A claim form submission as received.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "phoneNumber")]
    pub phone: Option<String>,
    #[serde(default)]
    pub activation_code: String,
    #[serde(default)]
    pub purchase_type: Option<String>,
}

/// A submission that passed validation, with every field trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidClaim {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub activation_code: String,
    pub purchase_type: Option<String>,
}

impl ClaimRequest {
    pub fn validate(self) -> Result<ValidClaim, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let email = self.email.trim();
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }

        let activation_code = self.activation_code.trim();
        if activation_code.is_empty() {
            return Err(ValidationError::MissingActivationCode);
        }

        let phone = match self.phone.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(normalize_phone(raw)?),
        };

        let purchase_type = self
            .purchase_type
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string);

        Ok(ValidClaim {
            name: name.to_string(),
            email: email.to_string(),
            phone,
            activation_code: activation_code.to_string(),
            purchase_type,
        })
    }
}

/// One `@`, a non-empty local part and a dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .split_once('.')
        .is_some_and(|(host, rest)| !host.is_empty() && !rest.is_empty() && !rest.ends_with('.'))
}

/// Reduce a phone number to digits with a country code.
///
/// Separators (spaces, `-`, `(`, `)`, a leading `+`) are dropped. Ten-digit
/// numbers get the default country code and a leading trunk `0` is
/// replaced by it. The result must be 11 to 15 digits.
pub fn normalize_phone(raw: &str) -> Result<String, ValidationError> {
    let invalid = || ValidationError::InvalidPhone(raw.to_string());

    let body = raw.strip_prefix('+').unwrap_or(raw);
    let mut digits = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '(' | ')' => {}
            _ => return Err(invalid()),
        }
    }

    let normalized = if digits.len() == 11 && digits.starts_with('0') {
        format!("{DEFAULT_COUNTRY_CODE}{}", &digits[1..])
    } else if digits.len() == 10 {
        format!("{DEFAULT_COUNTRY_CODE}{digits}")
    } else {
        digits
    };

    if (11..=15).contains(&normalized.len()) {
        Ok(normalized)
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(json: &str) -> ClaimRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn phone_normalisation() {
        assert_eq!(normalize_phone("9876543210").unwrap(), "919876543210");
        assert_eq!(normalize_phone("09876543210").unwrap(), "919876543210");
        assert_eq!(normalize_phone("+91 98765-43210").unwrap(), "919876543210");
        assert_eq!(normalize_phone("(44) 20 7946 0958").unwrap(), "442079460958");
        assert!(normalize_phone("12345").is_err());
        assert!(normalize_phone("98765x3210").is_err());
        assert!(normalize_phone("1234567890123456").is_err());
    }

    #[test]
    fn email_checks() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@mail.example.in"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("a@localhost"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn accepts_legacy_phone_number_field() {
        let valid = request(
            r#"{"name":" Meera ","email":"meera@example.com","phoneNumber":"9876543210","activationCode":" NF-1 "}"#,
        )
        .validate()
        .unwrap();
        assert_eq!(valid.name, "Meera");
        assert_eq!(valid.phone.as_deref(), Some("919876543210"));
        assert_eq!(valid.activation_code, "NF-1");
        assert!(valid.purchase_type.is_none());
    }

    #[test]
    fn rejects_missing_fields() {
        let err = request(r#"{"email":"a@b.co","activationCode":"X"}"#)
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingName);

        let err = request(r#"{"name":"A","email":"a@b.co","activationCode":"  "}"#)
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingActivationCode);

        let err = request(r#"{"name":"A","email":"nope","activationCode":"X"}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEmail(_)));
    }

    #[test]
    fn blank_phone_is_absent() {
        let valid = request(r#"{"name":"A","email":"a@b.co","phone":"  ","activationCode":"X"}"#)
            .validate()
            .unwrap();
        assert!(valid.phone.is_none());
    }
}
