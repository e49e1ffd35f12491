//
//  gitlab-client
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the GitLab REST API
//!
//! This module provides the shared vocabulary every API call is built from:
//! the error taxonomy, the structured GitLab error body, status classification
//! helpers, the explicit query-string builder and the generic records wrapper
//! returned by list endpoints.
//!
//! # Overview
//!
//! - [`Error`] - Unified error type for all client operations
//! - [`ApiError`] / [`ErrorBody`] - Decoded non-2xx responses
//! - [`Query`] / [`RequestOptions`] - Explicit request encoding per options type
//! - [`Records`] - Items of one page plus its [`PageInfo`]
//! - Pagination types (re-exported from the [`pagination`] submodule)
//!
//! # Example
//!
//! ```rust
//! use gitlab_client::api::common::{is_not_found, ApiError, Error, ErrorBody};
//! use reqwest::StatusCode;
//!
//! let err = Error::Api(ApiError::new(
//!     StatusCode::NOT_FOUND,
//!     ErrorBody::parse(r#"{"message":"404 Project Not Found"}"#),
//! ));
//!
//! assert!(is_not_found(&err));
//! assert_eq!(err.to_string(), "404 Project Not Found");
//! ```
//!
//! # Notes
//!
//! - Errors are returned to the caller, never logged or swallowed here
//! - Classification helpers walk the whole `source()` chain, so they also
//!   work on `anyhow::Error` values built on top of [`Error`]

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod pagination;

pub use pagination::*;

/// Unified error type for all GitLab client operations.
///
/// # Variants
///
/// | Variant | Category | When |
/// |---------|----------|------|
/// | `NoCredential` | Configuration | A call needs a credential but none is set |
/// | `Config` | Configuration | Invalid endpoint or HTTP client settings |
/// | `Auth` | Authentication | The credential cannot produce an auth header |
/// | `Transport` | Transport | Network, DNS, TLS or client timeout failures |
/// | `Timeout` | Transport | A caller-supplied deadline elapsed |
/// | `Api` | API | The server answered with a non-2xx status |
/// | `Decode` | Decode | A success response carried malformed JSON |
/// | `Encode` | Encode | A request body could not be serialised |
///
/// # Notes
///
/// - Nothing is retried by the client; retry policy belongs to the caller
/// - Use [`status_for_error`] and the `is_*` helpers for classification
#[derive(Error, Debug)]
pub enum Error {
    /// No credential was configured when one was required.
    #[error("No credential configured")]
    NoCredential,

    /// The client configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A credential is present but cannot authenticate the request.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A transport-level failure, propagated unchanged from `reqwest`.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller's deadline elapsed before the call completed.
    #[error("Request cancelled: deadline exceeded")]
    Timeout,

    /// The server returned a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A success response body could not be decoded.
    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        /// Path of the endpoint that produced the body
        endpoint: String,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be encoded as JSON.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl Error {
    /// Returns the HTTP status carried by an [`Error::Api`], if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api(api) => Some(api.status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Shorthand for [`is_not_found`].
    pub fn is_not_found(&self) -> bool {
        is_not_found(self)
    }

    /// Shorthand for [`is_timeout`].
    pub fn is_timeout(&self) -> bool {
        is_timeout(self)
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A non-2xx response decoded into a structured GitLab error.
///
/// Its `Display` output is the flattened message from
/// [`ErrorBody::message`], falling back to the status line when the body
/// carried nothing useful.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code of the response.
    pub status: StatusCode,
    /// Decoded error body.
    pub body: ErrorBody,
}

impl ApiError {
    /// Creates an API error from a status code and decoded body.
    pub fn new(status: StatusCode, body: ErrorBody) -> Self {
        Self { status, body }
    }

    /// Decodes a raw response body for the given status.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        Self::new(status, ErrorBody::parse(body))
    }

    /// The flattened, human-readable message.
    pub fn message(&self) -> String {
        self.body.message()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message();
        if message.is_empty() {
            write!(f, "API error ({})", self.status)
        } else {
            f.write_str(&message)
        }
    }
}

impl StdError for ApiError {}

/// GitLab error body covering both the OAuth and the validation shapes.
///
/// GitLab reports missing attributes as:
///
/// ```json
/// {"message": "400 (Bad request) \"title\" not given"}
/// ```
///
/// validation errors as a nested object:
///
/// ```json
/// {"message": {"name": ["has already been taken"]}}
/// ```
///
/// and OAuth failures as:
///
/// ```json
/// {"error": "invalid_grant", "error_description": "The provided authorization grant is invalid"}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// `message` field: a string or an arbitrarily nested object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<serde_json::Value>,

    /// OAuth `error` code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// OAuth `error_description`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl ErrorBody {
    /// Decodes an error body; anything that is not a JSON object is kept
    /// verbatim as a string message.
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<Self>(body) {
            Ok(parsed) => parsed,
            Err(_) => {
                let trimmed = body.trim();
                Self {
                    message: (!trimmed.is_empty())
                        .then(|| serde_json::Value::String(trimmed.to_string())),
                    ..Self::default()
                }
            }
        }
    }

    /// Flattens the body into a single message.
    ///
    /// Priority: `error_description`, then `error`, then `message` as a
    /// string, then `message` serialised verbatim as JSON.
    pub fn message(&self) -> String {
        if let Some(description) = self.error_description.as_deref().filter(|d| !d.is_empty()) {
            return description.to_string();
        }
        if let Some(error) = self.error.as_deref().filter(|e| !e.is_empty()) {
            return error.to_string();
        }
        match &self.message {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Finds the HTTP status carried anywhere in an error chain.
///
/// Returns `None` for errors that never reached the server, such as DNS
/// failures or a missing credential.
pub fn status_for_error(err: &(dyn StdError + 'static)) -> Option<StatusCode> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(api) = e.downcast_ref::<ApiError>() {
            return Some(api.status);
        }
        if let Some(Error::Api(api)) = e.downcast_ref::<Error>() {
            return Some(api.status);
        }
        current = e.source();
    }
    None
}

/// `true` when the error chain carries a 404 response.
pub fn is_not_found(err: &(dyn StdError + 'static)) -> bool {
    status_for_error(err) == Some(StatusCode::NOT_FOUND)
}

/// `true` when the error chain carries a 403 response.
pub fn is_forbidden(err: &(dyn StdError + 'static)) -> bool {
    status_for_error(err) == Some(StatusCode::FORBIDDEN)
}

/// `true` when the error chain carries a 401 response.
pub fn is_unauthorized(err: &(dyn StdError + 'static)) -> bool {
    status_for_error(err) == Some(StatusCode::UNAUTHORIZED)
}

/// `true` when the error chain contains a client timeout or an elapsed
/// caller deadline.
pub fn is_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(client_err) = e.downcast_ref::<Error>() {
            match client_err {
                Error::Timeout => return true,
                Error::Transport(transport) if transport.is_timeout() => return true,
                _ => {}
            }
        }
        if let Some(transport) = e.downcast_ref::<reqwest::Error>() {
            if transport.is_timeout() {
                return true;
            }
        }
        current = e.source();
    }
    false
}

/// Ordered query-string parameters for a GET request.
///
/// Option types fill a `Query` explicitly in [`RequestOptions::append_query`];
/// `None` values are skipped so unset fields never reach the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Appends a parameter when `value` is `Some`.
    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Appends an RFC 3339 timestamp when `value` is `Some`.
    pub fn push_time(&mut self, key: &str, value: Option<&DateTime<Utc>>) -> &mut Self {
        self.push_opt(key, value.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)))
    }

    /// Appends one `key[]=value` pair per element.
    pub fn push_list<V: ToString>(&mut self, key: &str, values: &[V]) -> &mut Self {
        let key = format!("{key}[]");
        for value in values {
            self.push(&key, value.to_string());
        }
        self
    }

    /// First value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// `true` when no parameter was added.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Request-side encoding of an options value.
///
/// The invocation pipeline calls [`append_query`](Self::append_query) for
/// GET requests and [`json_body`](Self::json_body) for every other method.
/// Both default to "nothing", so a type only implements the side it uses.
pub trait RequestOptions: Send + Sync {
    /// Writes this value's query parameters.
    fn append_query(&self, _query: &mut Query) {}

    /// Serialises this value as a JSON request body.
    fn json_body(&self) -> std::result::Result<Option<serde_json::Value>, serde_json::Error> {
        Ok(None)
    }
}

/// Implements [`RequestOptions::json_body`] through `serde_json::to_value`.
macro_rules! json_body_options {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::api::common::RequestOptions for $ty {
                fn json_body(
                    &self,
                ) -> ::std::result::Result<Option<::serde_json::Value>, ::serde_json::Error> {
                    ::serde_json::to_value(self).map(Some)
                }
            }
        )+
    };
}

pub(crate) use json_body_options;

impl RequestOptions for BTreeMap<String, String> {
    fn append_query(&self, query: &mut Query) {
        for (key, value) in self {
            query.push(key, value);
        }
    }

    fn json_body(&self) -> std::result::Result<Option<serde_json::Value>, serde_json::Error> {
        serde_json::to_value(self).map(Some)
    }
}

/// One page of a list endpoint: the decoded items plus pagination metadata.
///
/// Every list operation returns this wrapper; feed
/// [`next_options`](Self::next_options) back into the same call to walk
/// the result set.
#[derive(Debug, Clone)]
pub struct Records<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Pagination metadata decoded from the response headers.
    pub page_info: PageInfo,
}

impl<T> Records<T> {
    /// Wraps decoded items with their page metadata.
    pub fn new(items: Vec<T>, page_info: PageInfo) -> Self {
        Self { items, page_info }
    }

    /// Options for the following page, or `None` on the last page.
    pub fn next_options(&self) -> Option<ListOptions> {
        self.page_info.next()
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when the page is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the items on this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Consumes the wrapper, keeping only the items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> IntoIterator for Records<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_missing_attribute() {
        let body = ErrorBody::parse(r#"{"message":"400 (Bad request) \"title\" not given"}"#);
        assert_eq!(body.message(), r#"400 (Bad request) "title" not given"#);
    }

    #[test]
    fn test_message_prefers_error_description() {
        let body = ErrorBody::parse(r#"{"error":"invalid_grant","error_description":"bad code"}"#);
        assert_eq!(body.message(), "bad code");
    }

    #[test]
    fn test_message_falls_back_to_error_code() {
        let body = ErrorBody::parse(r#"{"error":"invalid_token"}"#);
        assert_eq!(body.message(), "invalid_token");
    }

    #[test]
    fn test_message_serialises_validation_object() {
        let body = ErrorBody::parse(r#"{"message":{"name":["has already been taken"]}}"#);
        assert_eq!(body.message(), r#"{"name":["has already been taken"]}"#);
    }

    #[test]
    fn test_non_json_body_kept_verbatim() {
        let body = ErrorBody::parse("502 Bad Gateway\n");
        assert_eq!(body.message(), "502 Bad Gateway");
        assert_eq!(ErrorBody::parse("").message(), "");
    }

    #[test]
    fn test_api_error_display_falls_back_to_status() {
        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.to_string(), "API error (500 Internal Server Error)");
    }

    #[test]
    fn test_classification_on_api_errors() {
        let not_found = Error::Api(ApiError::from_response(StatusCode::NOT_FOUND, "{}"));
        let forbidden = Error::Api(ApiError::from_response(StatusCode::FORBIDDEN, "{}"));
        let unauthorized = Error::Api(ApiError::from_response(StatusCode::UNAUTHORIZED, "{}"));

        assert!(is_not_found(&not_found));
        assert!(!is_forbidden(&not_found));
        assert!(is_forbidden(&forbidden));
        assert!(is_unauthorized(&unauthorized));
        assert_eq!(status_for_error(&forbidden), Some(StatusCode::FORBIDDEN));
    }

    #[test]
    fn test_classification_never_panics_on_foreign_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(!is_not_found(&io));
        assert!(!is_timeout(&io));
        assert_eq!(status_for_error(&io), None);

        assert!(!is_not_found(&Error::NoCredential));
        assert!(!is_unauthorized(&Error::Auth("empty token".into())));
    }

    #[test]
    fn test_classification_through_anyhow_chain() {
        let err = anyhow::Error::new(Error::Api(ApiError::from_response(
            StatusCode::NOT_FOUND,
            r#"{"message":"404 Not found"}"#,
        )))
        .context("Failed to delete branch");

        assert!(is_not_found(err.as_ref()));
    }

    #[test]
    fn test_timeout_classification() {
        assert!(is_timeout(&Error::Timeout));
        assert!(Error::Timeout.is_timeout());
        assert!(!is_timeout(&Error::NoCredential));
    }

    #[test]
    fn test_query_skips_unset_values() {
        let mut query = Query::new();
        query
            .push("page", 2)
            .push_opt("search", None::<&str>)
            .push_opt("archived", Some(false))
            .push_list("skip_groups", &[1, 2]);

        assert_eq!(
            query.pairs(),
            &[
                ("page".to_string(), "2".to_string()),
                ("archived".to_string(), "false".to_string()),
                ("skip_groups[]".to_string(), "1".to_string()),
                ("skip_groups[]".to_string(), "2".to_string()),
            ]
        );
        assert_eq!(query.get("search"), None);
    }

    #[test]
    fn test_query_time_format() {
        let when = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut query = Query::new();
        query.push_time("since", Some(&when));
        assert_eq!(query.get("since"), Some("2024-03-01T10:00:00Z"));
    }
}
