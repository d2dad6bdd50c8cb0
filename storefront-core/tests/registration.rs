use std::sync::Arc;

use storefront_core::{Registration, RegistrationForm, StorefrontError};
use storefront_test::{ApiCall, RecordingApi};

#[tokio::test]
async fn invalid_form_never_reaches_the_service() {
    let api = RecordingApi::new();
    let registration = Registration::new(Arc::new(api.clone()));

    let err = registration
        .register(&RegistrationForm::new("", "", "x"))
        .await
        .unwrap_err();

    let StorefrontError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["username", "password", "confirm_password"]);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn valid_form_posts_username_and_password() {
    let api = RecordingApi::new();
    let registration = Registration::new(Arc::new(api.clone()));

    registration
        .register(&RegistrationForm::new("crio.do", "learnbydoing", "learnbydoing"))
        .await
        .unwrap();

    assert_eq!(api.calls(), vec![ApiCall::Register("crio.do".into())]);
}

#[tokio::test]
async fn service_rejection_is_surfaced() {
    let api = RecordingApi::new();
    api.fail_register(StorefrontError::Rejected {
        status: 400,
        message: "Username is already taken".into(),
    });
    let registration = Registration::new(Arc::new(api.clone()));

    let err = registration
        .register(&RegistrationForm::new("crio.do", "learnbydoing", "learnbydoing"))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Username is already taken");
    assert!(!err.is_local());
}
