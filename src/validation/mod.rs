use crate::api::ApiError;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Per-field messages shown under form inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<String> {
        self.0.get(field).cloned()
    }

    /// The first message wins when the same field is reported twice.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn require(&mut self, field: &str, value: &str, label: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{label} is required"));
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "Email is required");
        } else if !is_valid_email(value) {
            self.add(field, "Email is not valid");
        }
    }

    pub fn password(&mut self, field: &str, value: &str) {
        if value.chars().count() < MIN_PASSWORD_LEN {
            self.add(
                field,
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
    }

    pub fn from_api(e: &ApiError) -> Self {
        let mut out = Self::default();
        for fe in e.field_errors() {
            if !fe.field.is_empty() {
                out.add(&fe.field, fe.message.clone());
            }
        }
        out
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co"));
        assert!(is_valid_email("  user@example.com "));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@.com"));
    }

    #[test]
    fn form_errors_collect_first_message_per_field() {
        let mut errors = FormErrors::default();
        errors.require("name", " ", "Name");
        errors.add("name", "ignored");
        errors.email("email", "nope");
        errors.password("password", "abc");
        assert_eq!(errors.get("name").as_deref(), Some("Name is required"));
        assert_eq!(errors.get("email").as_deref(), Some("Email is not valid"));
        assert!(errors.get("password").is_some());
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn form_errors_from_validation_response() {
        let e = ApiError::from_status(
            400,
            r#"[{"field": "key", "message": "Key already used"}, {"field": "", "message": "x"}]"#
                .to_string(),
        );
        let errors = FormErrors::from_api(&e);
        assert_eq!(errors.get("key").as_deref(), Some("Key already used"));
        assert_eq!(errors.0.len(), 1);
    }

    #[test]
    fn non_validation_errors_have_no_fields() {
        let e = ApiError::from_status(409, "dup".to_string());
        assert!(FormErrors::from_api(&e).is_empty());
        assert!(FormErrors::default().into_result().is_ok());
    }
}
