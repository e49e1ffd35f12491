//
//  gitlab-client
//  auth/oauth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # OAuth 2.0 Token Exchange
//!
//! This module implements the GitLab OAuth 2.0 token endpoint for the
//! authorization-code and resource-owner password grants, plus the pure
//! authorize-URL builder used to start the authorization-code flow.
//!
//! ## Flow Overview
//!
//! 1. **Authorize**: send the user to the URL from [`authorize_url`]
//! 2. **Callback**: GitLab redirects to `redirect_uri?code=...`
//! 3. **Exchange**: call [`OAuth::access_token`] with
//!    [`TokenRequest::with_code`]
//! 4. **Reuse**: later calls are served from the client's token cache and
//!    refreshed transparently with the cached refresh token
//!
//! ## Example
//!
//! ```rust,no_run
//! use gitlab_client::auth::{Credential, TokenRequest};
//! use gitlab_client::{ClientOptions, GitlabClient};
//!
//! async fn login(code: &str) -> gitlab_client::Result<()> {
//!     let credential = Credential::authorization_code(
//!         "https://gitlab.example.com",
//!         "client-id",
//!         "client-secret",
//!         "http://localhost:8080/callback",
//!     );
//!     let client = GitlabClient::new(Some(credential), ClientOptions::default())?;
//!
//!     let grant = client.oauth().access_token(&TokenRequest::with_code(code)).await?;
//!     if let Some(token) = grant.token() {
//!         println!("token expires in {:?}s", token.expires_in);
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::api::client::GitlabClient;
use crate::api::common::{json_body_options, Error, Result};

/// Path of the token endpoint, relative to the instance root.
pub const TOKEN_PATH: &str = "/oauth/token";

/// Path of the authorization endpoint, relative to the instance root.
pub const AUTHORIZE_PATH: &str = "/oauth/authorize";

/// Token issued by the GitLab token endpoint.
///
/// Immutable once issued; a refresh produces a new value that replaces
/// the cached one.
///
/// # Fields
///
/// - `access_token`: Value sent in the `Authorization: Bearer` header
/// - `refresh_token`: Used to obtain a replacement without user interaction
/// - `expires_in`: Lifetime in seconds, `None` when not reported
/// - `created_at`: Unix timestamp of issuance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,

    #[serde(default)]
    pub token_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub scope: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl AccessToken {
    /// Bearer token with the given lifetime.
    pub fn bearer(access_token: impl Into<String>, expires_in: Option<i64>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            expires_in,
            ..Self::default()
        }
    }
}

/// Outcome of resolving a token for an authenticated call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    /// A usable access token, fresh from the cache or the token endpoint.
    Token(AccessToken),
    /// The credential authenticates directly and has nothing to exchange.
    NotRequired,
}

impl TokenGrant {
    /// The granted token, if any.
    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            Self::Token(token) => Some(token),
            Self::NotRequired => None,
        }
    }
}

/// Optional inputs to a token exchange.
///
/// An explicit `refresh_token` always bypasses the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRequest {
    pub code: Option<String>,
    pub refresh_token: Option<String>,
}

impl TokenRequest {
    /// Exchange an authorization code.
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            refresh_token: None,
        }
    }

    /// Exchange a refresh token.
    pub fn with_refresh_token(refresh_token: impl Into<String>) -> Self {
        Self {
            code: None,
            refresh_token: Some(refresh_token.into()),
        }
    }
}

/// JSON body posted to the token endpoint.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenRequestBody(BTreeMap<&'static str, String>);

impl TokenRequestBody {
    pub(crate) fn new(grant_type: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("grant_type", grant_type.to_string());
        Self(fields)
    }

    pub(crate) fn field(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(key, value.into());
        self
    }

    /// The value of one body field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The `grant_type` field.
    pub fn grant_type(&self) -> &str {
        self.get("grant_type").unwrap_or_default()
    }
}

impl fmt::Debug for TokenRequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequestBody")
            .field("grant_type", &self.grant_type())
            .field("fields", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

json_body_options!(TokenRequestBody);

/// Builds the authorization URL for the authorization-code flow.
///
/// No network call is made.
///
/// ```rust
/// let url = gitlab_client::auth::authorize_url(
///     "https://gitlab.com",
///     "abc",
///     "http://localhost/cb",
///     "api",
/// )
/// .unwrap();
///
/// assert_eq!(
///     url.as_str(),
///     "https://gitlab.com/oauth/authorize?response_type=code&client_id=abc&redirect_uri=http%3A%2F%2Flocalhost%2Fcb&scope=api"
/// );
/// ```
pub fn authorize_url(endpoint: &str, client_id: &str, redirect_uri: &str, scope: &str) -> Result<Url> {
    let base = format!("{}{}", endpoint.trim_end_matches('/'), AUTHORIZE_PATH);
    let mut url = Url::parse(&base)
        .map_err(|e| Error::Config(format!("Invalid endpoint '{endpoint}': {e}")))?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", scope);
    Ok(url)
}

/// OAuth operations bound to one client and its token cache.
pub struct OAuth<'a> {
    client: &'a GitlabClient,
}

impl<'a> OAuth<'a> {
    pub(crate) fn new(client: &'a GitlabClient) -> Self {
        Self { client }
    }

    /// Authorization URL for the client's authorization-code credential.
    pub fn authorize_url(&self, scope: &str) -> Result<Url> {
        match self.client.credential() {
            None => Err(Error::NoCredential),
            Some(credential) => match credential.authorization_client() {
                Some((client_id, redirect_uri)) => {
                    authorize_url(credential.endpoint(), client_id, redirect_uri, scope)
                }
                None => Err(Error::Auth(
                    "authorize URL requires an authorization-code credential".to_string(),
                )),
            },
        }
    }

    /// Returns a valid token, exchanging or refreshing when needed.
    pub async fn token(&self) -> Result<TokenGrant> {
        self.access_token(&TokenRequest::default()).await
    }

    /// Resolves a token for `request`.
    ///
    /// 1. Without an explicit refresh token, a valid cached token is
    ///    returned as is.
    /// 2. Without a credential, [`Error::NoCredential`].
    /// 3. An authorization-code credential with no code falls back to the
    ///    cached refresh token.
    /// 4. Credentials with nothing to exchange yield
    ///    [`TokenGrant::NotRequired`].
    /// 5. Otherwise the body is posted to `/oauth/token` and the decoded
    ///    token replaces the cached one.
    pub async fn access_token(&self, request: &TokenRequest) -> Result<TokenGrant> {
        let tokens = self.client.tokens();

        if request.refresh_token.is_none() {
            if let Some(token) = tokens.get() {
                debug!("Token cache hit");
                return Ok(TokenGrant::Token(token));
            }
        }

        let credential = self.client.credential().ok_or(Error::NoCredential)?;

        let mut request = request.clone();
        if request.code.is_none() && request.refresh_token.is_none() && credential.is_authorization_code() {
            if let Some(refresh_token) = tokens.refresh_token() {
                debug!("Refreshing expired token with cached refresh token");
                request.refresh_token = Some(refresh_token);
            }
        }

        let Some(body) = credential.token_request_body(&request)? else {
            debug!("Credential authenticates directly, no token exchange");
            return Ok(TokenGrant::NotRequired);
        };

        debug!(grant_type = body.grant_type(), "Exchanging token");
        let reply = self
            .client
            .invoke(Method::POST, &self.client.root_url(TOKEN_PATH), &body)
            .await?;
        let token: AccessToken = reply.json()?;

        tokens.store(token.clone());
        debug!(expires_in = ?token.expires_in, "Token cached");

        Ok(TokenGrant::Token(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ClientOptions;
    use crate::api::common::RequestOptions;
    use crate::auth::{Credential, TokenType};
    use mockito::{Matcher, Server};
    use serde_json::json;

    const TOKEN_BODY: &str = r#"{
        "access_token": "de6780bc506a0446309bd9362820ba8aed28aa506c71eedbe1c5c4f9dd350e54",
        "token_type": "Bearer",
        "expires_in": 7200,
        "refresh_token": "8257e65c97202ed1726cf9571600918f3bffb2544b26e00a61df9897668c33a1",
        "scope": "api",
        "created_at": 1607635748
    }"#;

    fn client_for(credential: Credential) -> GitlabClient {
        GitlabClient::new(Some(credential), ClientOptions::default()).unwrap()
    }

    #[test]
    fn test_authorize_url_is_pure() {
        let url = authorize_url("https://gitlab.example.com/", "id", "urn:ietf:wg:oauth:2.0:oob", "api read_user").unwrap();
        assert_eq!(url.path(), "/oauth/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("response_type".to_string(), "code".to_string()));
        assert_eq!(pairs[3], ("scope".to_string(), "api read_user".to_string()));
    }

    #[test]
    fn test_authorize_url_rejects_bad_endpoint() {
        assert!(matches!(
            authorize_url("not a url", "id", "cb", "api"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_token_body_serialises_as_flat_object() {
        let body = TokenRequestBody::new("password")
            .field("username", "root")
            .field("password", "hunter2");
        assert_eq!(
            body.json_body().unwrap(),
            Some(json!({"grant_type": "password", "username": "root", "password": "hunter2"}))
        );
        assert!(!format!("{body:?}").contains("hunter2"));
    }

    #[tokio::test]
    async fn test_no_credential() {
        let client = GitlabClient::new(None, ClientOptions::default()).unwrap();
        let err = client.oauth().token().await.unwrap_err();
        assert!(matches!(err, Error::NoCredential));
    }

    #[tokio::test]
    async fn test_static_token_needs_no_exchange() {
        let client = client_for(Credential::static_token(
            "https://gitlab.example.com",
            TokenType::Private,
            "glpat-xxxx",
        ));
        assert_eq!(client.oauth().token().await.unwrap(), TokenGrant::NotRequired);
    }

    #[tokio::test]
    async fn test_password_grant_is_cached() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::PartialJson(json!({
                "grant_type": "password",
                "username": "root",
                "password": "secret"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TOKEN_BODY)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(Credential::password(server.url(), "root", "secret"));

        let first = client.oauth().token().await.unwrap();
        let second = client.oauth().token().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.token().unwrap().expires_in, Some(7200));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_authorization_code_exchange() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::PartialJson(json!({
                "grant_type": "authorization_code",
                "code": "abc123",
                "client_id": "app",
                "client_secret": "shh",
                "redirect_uri": "http://localhost/cb"
            })))
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;

        let client = client_for(Credential::authorization_code(
            server.url(),
            "app",
            "shh",
            "http://localhost/cb",
        ));

        let grant = client
            .oauth()
            .access_token(&TokenRequest::with_code("abc123"))
            .await
            .unwrap();

        assert!(grant.token().unwrap().refresh_token.is_some());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_with_cached_refresh_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::PartialJson(json!({
                "grant_type": "refresh_token",
                "refresh_token": "cached-refresh"
            })))
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;

        let client = client_for(Credential::authorization_code(server.url(), "app", "shh", "cb"));
        let mut stale = AccessToken::bearer("stale", Some(10));
        stale.refresh_token = Some("cached-refresh".to_string());
        client.tokens().store(stale);

        let grant = client.oauth().token().await.unwrap();
        assert_ne!(grant.token().unwrap().access_token, "stale");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_authorization_code_without_code_fails() {
        let client = client_for(Credential::authorization_code(
            "https://gitlab.example.com",
            "app",
            "shh",
            "cb",
        ));
        assert!(matches!(client.oauth().token().await, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn test_invalid_grant_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"bad code"}"#)
            .create_async()
            .await;

        let client = client_for(Credential::authorization_code(server.url(), "app", "shh", "cb"));
        let err = client
            .oauth()
            .access_token(&TokenRequest::with_code("nope"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "bad code");
        assert_eq!(err.status(), Some(reqwest::StatusCode::BAD_REQUEST));
        assert!(client.tokens().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_refresh_token_bypasses_cache() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::PartialJson(json!({
                "grant_type": "refresh_token",
                "refresh_token": "given"
            })))
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;

        let client = client_for(Credential::authorization_code(server.url(), "app", "shh", "cb"));
        client.tokens().store(AccessToken::bearer("still-valid", Some(7200)));

        let grant = client
            .oauth()
            .access_token(&TokenRequest::with_refresh_token("given"))
            .await
            .unwrap();

        assert_ne!(grant.token().unwrap().access_token, "still-valid");
        mock.assert_async().await;
    }
}
