//
//  gitlab-client
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! This module provides the credential strategies a [`GitlabClient`](crate::GitlabClient)
//! can authenticate with, the OAuth 2.0 token exchange and the per-client
//! token cache.
//!
//! ## Supported Authentication Methods
//!
//! - **Static token**: a personal, project, group or CI job token sent on
//!   every request. Nothing is exchanged.
//! - **OAuth 2.0 authorization code**: an application's client id/secret
//!   plus the code returned to its redirect URI, exchanged for a bearer
//!   token that is refreshed transparently.
//! - **OAuth 2.0 password grant**: username and password exchanged for a
//!   bearer token.
//!
//! ## Module Structure
//!
//! - [`oauth`]: Token endpoint exchange and authorize-URL builder
//! - [`token`]: In-memory token cache with early expiry
//!
//! ## Example
//!
//! ```rust
//! use gitlab_client::auth::{Credential, TokenGrant, TokenType};
//!
//! let credential = Credential::static_token("https://gitlab.com", TokenType::Private, "glpat-123");
//! let request = reqwest::Client::new().get("https://gitlab.com/api/v4/user");
//! let request = credential.apply_to_request(request, &TokenGrant::NotRequired).unwrap();
//!
//! let built = request.build().unwrap();
//! assert_eq!(built.headers()["PRIVATE-TOKEN"], "glpat-123");
//! ```

pub mod oauth;
pub mod token;

pub use oauth::{authorize_url, AccessToken, OAuth, TokenGrant, TokenRequest, TokenRequestBody};
pub use token::{TokenCache, EXPIRY_MARGIN_SECS};

use std::fmt;
use std::str::FromStr;

use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};

use crate::api::common::{Error, Result};

/// Header carrying a personal, project or group access token.
pub const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Header carrying a CI job token.
pub const JOB_TOKEN_HEADER: &str = "JOB-TOKEN";

/// How a static token is presented to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `PRIVATE-TOKEN: <token>`
    Private,
    /// `JOB-TOKEN: <token>`
    Job,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bearer => "bearer",
            Self::Private => "private",
            Self::Job => "job",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bearer" | "oauth" => Ok(Self::Bearer),
            "private" | "private-token" => Ok(Self::Private),
            "job" | "job-token" => Ok(Self::Job),
            other => Err(format!(
                "invalid token type '{other}', expected bearer, private or job"
            )),
        }
    }
}

/// A configured strategy for proving identity to GitLab.
///
/// Exactly one credential is active per client. It is chosen at
/// construction and only replaced through
/// [`GitlabClient::set_credential`](crate::GitlabClient::set_credential).
///
/// # Variants
///
/// | Variant | Exchange | Stamp |
/// |---------|----------|-------|
/// | `StaticToken` | none | header per [`TokenType`] |
/// | `AuthorizationCode` | `authorization_code` / `refresh_token` grant | bearer |
/// | `Password` | `password` grant | bearer |
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// A token used as is.
    StaticToken {
        endpoint: String,
        token_type: TokenType,
        token: String,
    },
    /// OAuth 2.0 authorization-code grant.
    AuthorizationCode {
        endpoint: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    },
    /// OAuth 2.0 resource-owner password grant.
    Password {
        endpoint: String,
        username: String,
        password: String,
    },
}

impl Credential {
    pub fn static_token(
        endpoint: impl Into<String>,
        token_type: TokenType,
        token: impl Into<String>,
    ) -> Self {
        Self::StaticToken {
            endpoint: endpoint.into(),
            token_type,
            token: token.into(),
        }
    }

    pub fn authorization_code(
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self::AuthorizationCode {
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    pub fn password(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::Password {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Base URL of the GitLab instance.
    pub fn endpoint(&self) -> &str {
        match self {
            Self::StaticToken { endpoint, .. }
            | Self::AuthorizationCode { endpoint, .. }
            | Self::Password { endpoint, .. } => endpoint,
        }
    }

    /// Short name of the strategy, safe to display.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StaticToken { .. } => "static token",
            Self::AuthorizationCode { .. } => "oauth authorization code",
            Self::Password { .. } => "oauth password",
        }
    }

    pub(crate) fn is_authorization_code(&self) -> bool {
        matches!(self, Self::AuthorizationCode { .. })
    }

    /// `(client_id, redirect_uri)` of an authorization-code credential.
    pub(crate) fn authorization_client(&self) -> Option<(&str, &str)> {
        match self {
            Self::AuthorizationCode {
                client_id,
                redirect_uri,
                ..
            } => Some((client_id, redirect_uri)),
            _ => None,
        }
    }

    /// Builds the token endpoint body for `request`.
    ///
    /// Returns `Ok(None)` for a static token: there is nothing to exchange.
    /// An authorization-code credential needs either a code or a refresh
    /// token; with neither it fails with [`Error::Auth`].
    pub fn token_request_body(&self, request: &TokenRequest) -> Result<Option<TokenRequestBody>> {
        match self {
            Self::StaticToken { .. } => Ok(None),
            Self::AuthorizationCode {
                client_id,
                client_secret,
                redirect_uri,
                ..
            } => {
                let body = if let Some(refresh_token) = &request.refresh_token {
                    TokenRequestBody::new("refresh_token").field("refresh_token", refresh_token)
                } else if let Some(code) = &request.code {
                    TokenRequestBody::new("authorization_code").field("code", code)
                } else {
                    return Err(Error::Auth(
                        "an authorization code or refresh token is required".to_string(),
                    ));
                };
                Ok(Some(
                    body.field("client_id", client_id)
                        .field("client_secret", client_secret)
                        .field("redirect_uri", redirect_uri),
                ))
            }
            Self::Password { username, password, .. } => {
                let body = match &request.refresh_token {
                    Some(refresh_token) => {
                        TokenRequestBody::new("refresh_token").field("refresh_token", refresh_token)
                    }
                    None => TokenRequestBody::new("password")
                        .field("username", username)
                        .field("password", password),
                };
                Ok(Some(body))
            }
        }
    }

    /// Stamps `request` with this credential's proof of identity.
    ///
    /// Static tokens use their own value and ignore `grant`. OAuth
    /// credentials require a [`TokenGrant::Token`].
    pub fn apply_to_request(
        &self,
        request: RequestBuilder,
        grant: &TokenGrant,
    ) -> Result<RequestBuilder> {
        match self {
            Self::StaticToken {
                token_type, token, ..
            } => {
                if token.is_empty() {
                    return Err(Error::Auth("static token is empty".to_string()));
                }
                Ok(match token_type {
                    TokenType::Bearer => request.bearer_auth(token),
                    TokenType::Private => request.header(PRIVATE_TOKEN_HEADER, token),
                    TokenType::Job => request.header(JOB_TOKEN_HEADER, token),
                })
            }
            Self::AuthorizationCode { .. } | Self::Password { .. } => match grant.token() {
                Some(token) if !token.access_token.is_empty() => {
                    Ok(request.bearer_auth(&token.access_token))
                }
                _ => Err(Error::Auth(format!(
                    "{} credential has no access token",
                    self.kind()
                ))),
            },
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticToken {
                endpoint,
                token_type,
                ..
            } => f
                .debug_struct("StaticToken")
                .field("endpoint", endpoint)
                .field("token_type", token_type)
                .field("token", &"<redacted>")
                .finish(),
            Self::AuthorizationCode {
                endpoint,
                client_id,
                redirect_uri,
                ..
            } => f
                .debug_struct("AuthorizationCode")
                .field("endpoint", endpoint)
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .field("redirect_uri", redirect_uri)
                .finish(),
            Self::Password {
                endpoint, username, ..
            } => f
                .debug_struct("Password")
                .field("endpoint", endpoint)
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}
