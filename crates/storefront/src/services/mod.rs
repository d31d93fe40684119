//! Clients for the upstream REST services.
//!
//! All business logic (pricing, persistence, authorization enforcement)
//! lives in these services; this crate only renders their state and issues
//! calls:
//!
//! - [`users::UserClient`] - registration, login, profile read/update
//! - [`catalog::CatalogClient`] - product CRUD, token-gated, cached listing
//! - [`cart::CartClient`] - cart read/add/remove
//! - [`orders::OrderClient`] - order listing and cancellation
//!
//! The clients share one `reqwest::Client` and the [`ServiceError`]
//! taxonomy. The catalog and user services expect the bearer token issued
//! at login in the `Authorization` header, sent verbatim; the cart and
//! order services take no auth header.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod users;

pub use cart::CartClient;
pub use catalog::CatalogClient;
pub use orders::OrderClient;
pub use users::UserClient;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when calling an upstream service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP request failed (connection, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to decode a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ServiceError {
    /// Whether the failure was the service rejecting the request (4xx),
    /// as opposed to the service or transport being broken.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 400 && *status < 500)
    }

    /// The user-facing message for a rejection, if there is one.
    #[must_use]
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } if self.is_rejection() && !message.is_empty() => {
                Some(message)
            }
            _ => None,
        }
    }
}

/// Standard `{ data, message }` envelope used by the user and catalog
/// services.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shape shared by the services.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-success response into a [`ServiceError::Api`], pulling the
/// message out of a `{ "message": ... }` body when there is one.
pub(crate) async fn api_error(response: reqwest::Response) -> ServiceError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map_or(body, |parsed| parsed.message);

    ServiceError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_display() {
        let err = ServiceError::Api {
            status: 404,
            message: "No orders found".to_owned(),
        };
        assert_eq!(err.to_string(), "API error: 404 - No orders found");
    }

    #[test]
    fn rejection_detection() {
        let rejected = ServiceError::Api {
            status: 401,
            message: "Invalid credentials".to_owned(),
        };
        assert!(rejected.is_rejection());
        assert_eq!(rejected.rejection_message(), Some("Invalid credentials"));

        let broken = ServiceError::Api {
            status: 502,
            message: "upstream down".to_owned(),
        };
        assert!(!broken.is_rejection());
        assert_eq!(broken.rejection_message(), None);

        let silent = ServiceError::Api {
            status: 400,
            message: String::new(),
        };
        assert_eq!(silent.rejection_message(), None);
    }

    #[test]
    fn envelope_decodes_with_and_without_message() {
        let with: ApiEnvelope<Vec<i32>> =
            serde_json::from_str(r#"{"data":[1,2],"message":"ok"}"#).unwrap();
        assert_eq!(with.data, vec![1, 2]);
        assert_eq!(with.message.as_deref(), Some("ok"));

        let without: ApiEnvelope<Vec<i32>> = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(without.data.is_empty());
        assert!(without.message.is_none());
    }
}
