use serde::Serialize;

/// Message shown when the catalog service cannot be reached or answers with
/// something that is not the expected JSON.
pub const CONNECTIVITY_MESSAGE: &str =
    "Could not fetch products. Check that the backend is running, reachable and returns valid JSON.";

/// A field-level validation error, e.g. from the registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// How loudly a failure should be reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Every failure the storefront engine reports.
///
/// None of these are fatal: the operation that produced one leaves session
/// state as it was, and the caller may retry.
#[derive(Debug, Clone, PartialEq)]
pub enum StorefrontError {
    /// A cart mutation was attempted without a token. No request was sent.
    AuthRequired,

    /// The product is already in the cart and duplicates were disallowed.
    /// No request was sent.
    DuplicateItem(String),

    /// A quantity step was requested for a product that is not in the cart.
    /// No request was sent.
    NotInCart(String),

    /// The service found nothing. Search treats this as an empty result.
    NotFound,

    /// The service answered with a 5xx status.
    ServerFailure { status: u16, message: String },

    /// The service could not be reached, or its response could not be decoded.
    NetworkFailure(String),

    /// The service refused the request with a non-5xx error status.
    Rejected { status: u16, message: String },

    /// Input was rejected locally before any request was sent.
    Validation(Vec<FieldError>),
}

impl std::fmt::Display for StorefrontError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorefrontError::AuthRequired => write!(f, "Authentication required"),
            StorefrontError::DuplicateItem(id) => write!(f, "Product already in cart: {id}"),
            StorefrontError::NotInCart(id) => write!(f, "Product not in cart: {id}"),
            StorefrontError::NotFound => write!(f, "Not found"),
            StorefrontError::ServerFailure { status, message } => {
                write!(f, "Server failure ({status}): {message}")
            }
            StorefrontError::NetworkFailure(detail) => write!(f, "Network failure: {detail}"),
            StorefrontError::Rejected { status, message } => {
                write!(f, "Request rejected ({status}): {message}")
            }
            StorefrontError::Validation(errors) => {
                write!(f, "Validation failed:")?;
                for error in errors {
                    write!(f, "\n  - {}: {}", error.field, error.message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for StorefrontError {}

impl StorefrontError {
    /// Text suitable for a toast or status line.
    pub fn user_message(&self) -> String {
        match self {
            StorefrontError::AuthRequired => "Login to add an item to the Cart".into(),
            StorefrontError::DuplicateItem(_) => {
                "Item already in cart. Use the cart sidebar to update quantity or remove item."
                    .into()
            }
            StorefrontError::NotInCart(_) => "Item is not in the cart.".into(),
            StorefrontError::NotFound => "No products found".into(),
            StorefrontError::ServerFailure { message, .. } => message.clone(),
            StorefrontError::NetworkFailure(_) => CONNECTIVITY_MESSAGE.into(),
            StorefrontError::Rejected { message, .. } => message.clone(),
            StorefrontError::Validation(errors) => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "Invalid input".into()),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            StorefrontError::AuthRequired
            | StorefrontError::DuplicateItem(_)
            | StorefrontError::NotInCart(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// True when the failure was decided locally and nothing went over the wire.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            StorefrontError::AuthRequired
                | StorefrontError::DuplicateItem(_)
                | StorefrontError::NotInCart(_)
                | StorefrontError::Validation(_)
        )
    }
}
