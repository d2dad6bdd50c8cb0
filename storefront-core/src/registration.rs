use std::sync::Arc;

use garde::Validate;

use crate::api::StorefrontApi;
use crate::error::{FieldError, StorefrontError};
use crate::model::RegisterRequest;

const MIN_LEN: usize = 6;

/// What the user typed into the registration form.
#[derive(Debug, Clone, Default, Validate)]
pub struct RegistrationForm {
    #[garde(custom(username_rules))]
    pub username: String,
    #[garde(custom(password_rules))]
    pub password: String,
    #[garde(matches(password))]
    pub confirm_password: String,
}

fn required_min_len(label: &str, value: &str) -> garde::Result {
    if value.is_empty() {
        return Err(garde::Error::new(format!("{label} is a required field")));
    }
    if value.chars().count() < MIN_LEN {
        return Err(garde::Error::new(format!(
            "{label} must be at least {MIN_LEN} characters"
        )));
    }
    Ok(())
}

fn username_rules(value: &str, _ctx: &()) -> garde::Result {
    required_min_len("Username", value)
}

fn password_rules(value: &str, _ctx: &()) -> garde::Result {
    required_min_len("Password", value)
}

impl RegistrationForm {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Check the form locally. Errors come back in field order: username,
    /// password, confirmation.
    pub fn check(&self) -> Result<RegisterRequest, StorefrontError> {
        if let Err(report) = self.validate() {
            let mut errors: Vec<FieldError> = report
                .iter()
                .map(|(path, error)| {
                    let field = path.to_string();
                    let message = if field == "confirm_password" {
                        "Passwords do not match".to_string()
                    } else {
                        error.message().to_string()
                    };
                    FieldError { field, message }
                })
                .collect();
            errors.sort_by_key(|e| field_rank(&e.field));
            return Err(StorefrontError::Validation(errors));
        }
        Ok(RegisterRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

fn field_rank(field: &str) -> u8 {
    match field {
        "username" => 0,
        "password" => 1,
        _ => 2,
    }
}

/// Creates user accounts.
#[derive(Clone)]
pub struct Registration {
    api: Arc<dyn StorefrontApi>,
}

impl Registration {
    pub fn new(api: Arc<dyn StorefrontApi>) -> Self {
        Self { api }
    }

    /// Validate `form` and, if it passes, register the user. An invalid form
    /// never reaches the service.
    pub async fn register(&self, form: &RegistrationForm) -> Result<(), StorefrontError> {
        let request = form.check()?;
        match self.api.register(&request).await {
            Ok(()) => {
                tracing::info!(username = %request.username, "User registered");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(username = %request.username, error = %err, "Registration failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(form: RegistrationForm) -> Vec<String> {
        match form.check() {
            Err(StorefrontError::Validation(errors)) => {
                errors.into_iter().map(|e| e.message).collect()
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_form_becomes_request() {
        let request = RegistrationForm::new("crio.do", "learnbydoing", "learnbydoing")
            .check()
            .unwrap();
        assert_eq!(request.username, "crio.do");
        assert_eq!(request.password, "learnbydoing");
    }

    #[test]
    fn empty_username_is_required() {
        let msgs = messages(RegistrationForm::new("", "learnbydoing", "learnbydoing"));
        assert_eq!(msgs, vec!["Username is a required field"]);
    }

    #[test]
    fn short_password_is_rejected() {
        let msgs = messages(RegistrationForm::new("crio.do", "abc", "abc"));
        assert_eq!(msgs, vec!["Password must be at least 6 characters"]);
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let msgs = messages(RegistrationForm::new("crio.do", "learnbydoing", "learnbydoinG"));
        assert_eq!(msgs, vec!["Passwords do not match"]);
    }

    #[test]
    fn first_message_is_the_username_one() {
        let err = RegistrationForm::new("abc", "x", "y").check().unwrap_err();
        assert_eq!(err.user_message(), "Username must be at least 6 characters");
    }
}
