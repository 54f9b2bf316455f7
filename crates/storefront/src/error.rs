//! Error types surfaced by the session client and the API wrapper.
//!
//! Every network-facing operation returns [`Result<T>`]; messages are
//! meant to be shown to a person, so server-provided detail text is
//! carried through verbatim where the API supplies it.

use reqwest::StatusCode;
use thiserror::Error;

use crate::session::StorageError;

/// Errors returned by [`SessionClient`](crate::session::SessionClient) and
/// [`ApiClient`](crate::api::ApiClient).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials rejected: bad login, expired refresh token, or an
    /// access token the profile endpoint refused.
    #[error("{0}")]
    Auth(String),

    /// An operation needed a stored credential pair and none was present.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The signed-in user lacks the privileges an operation requires.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Non-2xx response without more specific handling.
    #[error("{message} (HTTP {status})")]
    RequestFailed {
        /// Status returned by the API.
        status: StatusCode,
        /// Best-effort message extracted from the response body.
        message: String,
    },

    /// Payment verification was accepted but the gateway has not settled yet.
    #[error("{0}")]
    PaymentPending(String),

    /// A list endpoint answered with something other than a JSON array.
    #[error("Unexpected payload from {0}")]
    UnexpectedPayload(String),

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint path could not be joined onto the API base.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Reading or writing the credential store failed.
    #[error("Credential storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Whether the caller should send the user back to sign in.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        match self {
            Self::Auth(_) | Self::NotAuthenticated => true,
            Self::RequestFailed { status, .. } => status.as_u16() == 401,
            _ => false,
        }
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Cart usage errors. Mutations themselves never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartError {
    /// The cart was used outside a [`CartProvider`](crate::cart::CartProvider) scope.
    #[error("use_cart must be called within a CartProvider scope")]
    NotInitialized,

    /// A line item was built with a negative unit price.
    #[error("unit price must not be negative")]
    NegativePrice,
}

/// Errors turning a cart into a placed order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please select a delivery location")]
    MissingLocation,

    /// A cart line does not refer to a catalog product.
    #[error("Cart item {0:?} is not a product")]
    InvalidProductId(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}
