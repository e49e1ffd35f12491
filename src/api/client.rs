//
//  gitlab-client
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client for the GitLab REST API
//!
//! This module provides [`GitlabClient`], the single chokepoint every API
//! call passes through.
//!
//! ## Features
//!
//! - API version prefixing (`/api/v4/...`) for relative paths
//! - Query-string encoding for GET, JSON bodies for every other method
//! - Token resolution and auth header injection before sending
//! - Uniform decoding of GitLab error bodies into [`ApiError`]
//! - Pagination metadata for list endpoints
//! - Optional rate limiter hook and caller-supplied deadlines
//!
//! Nothing is retried here. A failed call returns its error to the caller.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Certificate, Client, Method, Proxy, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use super::common::{ApiError, Error, ListOptions, PageInfo, Query, Records, RequestOptions, Result};
use super::resources::{
    Branches, Commits, Groups, Instance, MergeRequests, Projects, Tags, Users,
};
use crate::auth::{Credential, OAuth, TokenCache};

/// Default GitLab instance.
pub const CLOUD_ENDPOINT: &str = "https://gitlab.com";

/// Default REST API version segment.
pub const DEFAULT_API_VERSION: &str = "v4";

/// Hook awaited before every outgoing request.
///
/// Implementations decide how long to wait; the client never retries or
/// reorders requests on their behalf.
#[async_trait]
pub trait RateLimiter: Send + Sync + fmt::Debug {
    /// Resolves once the next request may be sent.
    async fn acquire(&self);
}

/// Optional settings for [`GitlabClient::new`].
///
/// Every field has a default, so `ClientOptions::default()` talks to the
/// credential's endpoint with API `v4` and no timeout.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// API version segment, default `v4`.
    pub api_version: Option<String>,
    /// `User-Agent` header, default `gl/<version>`.
    pub user_agent: Option<String>,
    /// Total timeout applied by the HTTP client to each request.
    pub timeout: Option<Duration>,
    /// Proxy for all requests.
    pub proxy: Option<Proxy>,
    /// Extra trusted root certificates.
    pub root_certificates: Vec<Certificate>,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
    /// Log request and response bodies at `trace` level.
    pub debug: bool,
    /// Awaited before each request.
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl ClientOptions {
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_proxy(mut self, proxy: Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_root_certificate(mut self, certificate: Certificate) -> Self {
        self.root_certificates.push(certificate);
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }
}

impl RequestOptions for () {}

/// Pre-send hook that attaches proof of identity to a request.
type Stamp<'a> = &'a (dyn Fn(RequestBuilder) -> Result<RequestBuilder> + Send + Sync);

/// The GitLab REST API client.
///
/// One client owns one credential and one token cache. It is cheap to
/// share behind an `Arc` and may be used from many tasks at once.
///
/// # Example
///
/// ```rust,no_run
/// use gitlab_client::auth::{Credential, TokenType};
/// use gitlab_client::{ClientOptions, GitlabClient, ListOptions};
///
/// # async fn example() -> gitlab_client::Result<()> {
/// let client = GitlabClient::new(
///     Some(Credential::static_token("https://gitlab.com", TokenType::Private, "glpat-xxxx")),
///     ClientOptions::default(),
/// )?;
///
/// let page = client.projects().list(&Default::default()).await?;
/// for project in &page.items {
///     println!("{}", project.path_with_namespace);
/// }
/// # Ok(())
/// # }
/// ```
pub struct GitlabClient {
    http: Client,
    endpoint: String,
    api_version: String,
    credential: Option<Credential>,
    tokens: TokenCache,
    debug: bool,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl GitlabClient {
    /// Creates a client for `credential`'s endpoint, or gitlab.com when
    /// no credential is given.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the endpoint is not an absolute URL or the
    /// HTTP client cannot be built from `options`.
    pub fn new(credential: Option<Credential>, options: ClientOptions) -> Result<Self> {
        let endpoint = normalise_endpoint(
            credential
                .as_ref()
                .map(Credential::endpoint)
                .unwrap_or(CLOUD_ENDPOINT),
        )?;

        let user_agent = options
            .user_agent
            .unwrap_or_else(|| format!("{}/{}", crate::APP_NAME, crate::VERSION));

        let mut builder = Client::builder()
            .user_agent(user_agent)
            .danger_accept_invalid_certs(options.accept_invalid_certs);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = options.proxy {
            builder = builder.proxy(proxy);
        }
        for certificate in options.root_certificates {
            builder = builder.add_root_certificate(certificate);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            api_version: options
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            credential,
            tokens: TokenCache::new(),
            debug: options.debug,
            rate_limiter: options.rate_limiter,
        })
    }

    /// Replaces the credential, re-targets the client at its endpoint and
    /// empties the token cache.
    pub fn set_credential(&mut self, credential: Option<Credential>) -> Result<()> {
        self.endpoint = normalise_endpoint(
            credential
                .as_ref()
                .map(Credential::endpoint)
                .unwrap_or(CLOUD_ENDPOINT),
        )?;
        self.credential = credential;
        self.tokens.clear();
        debug!(endpoint = %self.endpoint, "Credential replaced, token cache cleared");
        Ok(())
    }

    /// The active credential.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Base URL of the GitLab instance, without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// The client's token cache.
    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Full URL for `path`.
    ///
    /// Absolute URLs and paths already under `/api/` are used as is;
    /// anything else is placed under `/api/<version>/`.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with("/api/") {
            format!("{}{}", self.endpoint, path)
        } else {
            format!(
                "{}/api/{}/{}",
                self.endpoint,
                self.api_version,
                path.trim_start_matches('/')
            )
        }
    }

    /// Full URL for `path` directly under the endpoint, outside the API
    /// prefix (e.g. `/oauth/token`).
    pub fn root_url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    /// Sends an unauthenticated request.
    ///
    /// GET requests encode `options` as query parameters; other methods
    /// send them as a JSON body. Pass `&()` when there is nothing to send.
    pub async fn invoke(
        &self,
        method: Method,
        path: &str,
        options: &dyn RequestOptions,
    ) -> Result<Reply> {
        self.execute(method, path, options, None).await
    }

    /// Sends a request stamped with the active credential.
    ///
    /// The token is resolved first (from the cache, an exchange or a
    /// refresh), then attached just before the request is sent.
    ///
    /// # Errors
    ///
    /// - [`Error::NoCredential`] when no credential is configured
    /// - [`Error::Auth`] when the credential cannot stamp the request
    /// - any error from [`invoke`](Self::invoke)
    pub async fn invoke_with_credential(
        &self,
        method: Method,
        path: &str,
        options: &dyn RequestOptions,
    ) -> Result<Reply> {
        let credential = self.credential.as_ref().ok_or(Error::NoCredential)?;
        let grant = self.oauth().token().await?;
        let stamp = |request: RequestBuilder| credential.apply_to_request(request, &grant);
        self.execute(method, path, options, Some(&stamp)).await
    }

    /// Authenticated GET decoded into `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, options: &dyn RequestOptions) -> Result<T> {
        self.invoke_with_credential(Method::GET, path, options)
            .await?
            .json()
    }

    /// Authenticated GET of one page of a list endpoint.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        list: &ListOptions,
        options: &dyn RequestOptions,
    ) -> Result<Records<T>> {
        self.invoke_with_credential(Method::GET, path, options)
            .await?
            .records(list)
    }

    /// Authenticated POST decoded into `T`.
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &dyn RequestOptions) -> Result<T> {
        self.invoke_with_credential(Method::POST, path, body)
            .await?
            .json()
    }

    /// Authenticated PUT decoded into `T`.
    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: &dyn RequestOptions) -> Result<T> {
        self.invoke_with_credential(Method::PUT, path, body)
            .await?
            .json()
    }

    /// Authenticated DELETE; the response body is ignored.
    pub async fn delete(&self, path: &str, options: &dyn RequestOptions) -> Result<()> {
        self.invoke_with_credential(Method::DELETE, path, options)
            .await
            .map(|_| ())
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        options: &dyn RequestOptions,
        stamp: Option<Stamp<'_>>,
    ) -> Result<Reply> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        let url = self.url_for(path);
        let sensitive = url.starts_with(&self.root_url("/oauth/"));
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json");

        if method == Method::GET {
            let mut query = Query::new();
            options.append_query(&mut query);
            if !query.is_empty() {
                request = request.query(query.pairs());
            }
        } else if let Some(body) = options.json_body().map_err(Error::Encode)? {
            if self.debug && !sensitive {
                trace!(body = %body, "Request body");
            }
            request = request.json(&body);
        }

        if let Some(stamp) = stamp {
            request = stamp(request)?;
        }

        debug!(method = %method, url = %url, "Sending request");
        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        debug!(method = %method, url = %url, status = status.as_u16(), "Received response");

        if self.debug && !sensitive {
            trace!(body = %body, "Response body");
        }

        if !status.is_success() {
            return Err(ApiError::from_response(status, &body).into());
        }

        Ok(Reply {
            status,
            headers,
            body,
            endpoint: path.to_string(),
        })
    }

    /// OAuth token operations.
    pub fn oauth(&self) -> OAuth<'_> {
        OAuth::new(self)
    }

    pub fn projects(&self) -> Projects<'_> {
        Projects::new(self)
    }

    pub fn branches(&self) -> Branches<'_> {
        Branches::new(self)
    }

    pub fn commits(&self) -> Commits<'_> {
        Commits::new(self)
    }

    pub fn tags(&self) -> Tags<'_> {
        Tags::new(self)
    }

    pub fn groups(&self) -> Groups<'_> {
        Groups::new(self)
    }

    pub fn merge_requests(&self) -> MergeRequests<'_> {
        MergeRequests::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn instance(&self) -> Instance<'_> {
        Instance::new(self)
    }
}

impl fmt::Debug for GitlabClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitlabClient")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("credential", &self.credential)
            .field("debug", &self.debug)
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

fn normalise_endpoint(endpoint: &str) -> Result<String> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| Error::Config(format!("Invalid endpoint '{endpoint}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Invalid endpoint '{endpoint}': scheme must be http or https"
        )));
    }
    Ok(trimmed.to_string())
}

/// A successful response, kept raw until the caller decodes it.
#[derive(Debug, Clone)]
pub struct Reply {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers, including pagination metadata.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: String,
    endpoint: String,
}

impl Reply {
    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|source| Error::Decode {
            endpoint: self.endpoint.clone(),
            source,
        })
    }

    /// Pagination metadata for a page requested with `options`.
    pub fn page_info(&self, options: &ListOptions) -> PageInfo {
        PageInfo::from_headers(options, &self.headers)
    }

    /// Decodes a list body together with its pagination metadata.
    pub fn records<T: DeserializeOwned>(&self, options: &ListOptions) -> Result<Records<T>> {
        Ok(Records::new(self.json()?, self.page_info(options)))
    }
}

/// Runs `future`, failing with [`Error::Timeout`] once `deadline` passes.
///
/// The in-flight request is dropped, which aborts it.
pub async fn with_deadline<T, F>(deadline: tokio::time::Instant, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout_at(deadline, future)
        .await
        .map_err(|_| Error::Timeout)?
}

/// Runs `future`, failing with [`Error::Timeout`] after `duration`.
pub async fn with_timeout<T, F>(duration: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    with_deadline(tokio::time::Instant::now() + duration, future).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::{is_not_found, is_timeout, is_unauthorized, status_for_error};
    use crate::auth::{AccessToken, TokenType};
    use mockito::{Matcher, Server};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn static_client(endpoint: &str, token_type: TokenType, token: &str) -> GitlabClient {
        GitlabClient::new(
            Some(Credential::static_token(endpoint, token_type, token)),
            ClientOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_url_for() {
        let client = static_client("https://gitlab.example.com/", TokenType::Bearer, "t");
        assert_eq!(client.endpoint(), "https://gitlab.example.com");
        assert_eq!(
            client.url_for("projects"),
            "https://gitlab.example.com/api/v4/projects"
        );
        assert_eq!(
            client.url_for("/projects"),
            "https://gitlab.example.com/api/v4/projects"
        );
        assert_eq!(
            client.root_url("/oauth/token"),
            "https://gitlab.example.com/oauth/token"
        );
        assert_eq!(
            client.url_for("/api/v4/version"),
            "https://gitlab.example.com/api/v4/version"
        );
        assert_eq!(
            client.url_for("https://other.example.com/api/v4/projects?id_after=3"),
            "https://other.example.com/api/v4/projects?id_after=3"
        );
    }

    #[test]
    fn test_api_version_override() {
        let client = GitlabClient::new(None, ClientOptions::default().with_api_version("v5")).unwrap();
        assert_eq!(client.endpoint(), CLOUD_ENDPOINT);
        assert_eq!(client.url_for("user"), "https://gitlab.com/api/v5/user");
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let result = GitlabClient::new(
            Some(Credential::static_token("gitlab.example.com", TokenType::Bearer, "t")),
            ClientOptions::default(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_set_credential_clears_cache() {
        let mut client = GitlabClient::new(None, ClientOptions::default()).unwrap();
        client.tokens().store(AccessToken::bearer("old", Some(7200)));

        client
            .set_credential(Some(Credential::password("https://gitlab.example.com", "u", "p")))
            .unwrap();

        assert!(client.tokens().is_empty());
        assert_eq!(client.endpoint(), "https://gitlab.example.com");
    }

    #[tokio::test]
    async fn test_static_token_header_sent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/user")
            .match_header("private-token", "glpat-abc")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;

        let client = static_client(&server.url(), TokenType::Private, "glpat-abc");
        let reply = client
            .invoke_with_credential(Method::GET, "user", &())
            .await
            .unwrap();

        assert_eq!(reply.status, StatusCode::OK);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_oauth_token_stamped_as_bearer() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body(r#"{"access_token":"fresh","token_type":"Bearer","expires_in":7200}"#)
            .expect(1)
            .create_async()
            .await;
        let user = server
            .mock("GET", "/api/v4/user")
            .match_header("authorization", "Bearer fresh")
            .with_status(200)
            .with_body(r#"{"id": 1}"#)
            .expect(2)
            .create_async()
            .await;

        let client = GitlabClient::new(
            Some(Credential::password(server.url(), "root", "pw")),
            ClientOptions::default(),
        )
        .unwrap();

        for _ in 0..2 {
            client
                .invoke_with_credential(Method::GET, "user", &())
                .await
                .unwrap();
        }

        token.assert_async().await;
        user.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_sends_query_and_post_sends_json() {
        let mut server = Server::new_async().await;
        let get = server
            .mock("GET", "/api/v4/search")
            .match_query(Matcher::UrlEncoded("scope".into(), "projects".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let post = server
            .mock("POST", "/api/v4/search")
            .match_body(Matcher::Json(serde_json::json!({"scope": "projects"})))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        let client = static_client(&server.url(), TokenType::Bearer, "t");
        let options: BTreeMap<String, String> =
            [("scope".to_string(), "projects".to_string())].into_iter().collect();

        client
            .invoke_with_credential(Method::GET, "search", &options)
            .await
            .unwrap();
        client
            .invoke_with_credential(Method::POST, "search", &options)
            .await
            .unwrap();

        get.assert_async().await;
        post.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_credential() {
        let client = GitlabClient::new(None, ClientOptions::default()).unwrap();
        let err = client
            .invoke_with_credential(Method::GET, "user", &())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoCredential));
    }

    #[tokio::test]
    async fn test_empty_static_token_never_sends() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/user")
            .expect(0)
            .create_async()
            .await;

        let client = static_client(&server.url(), TokenType::Job, "");
        let err = client
            .invoke_with_credential(Method::GET, "user", &())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Auth(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_body_decoded() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v4/projects/1/issues")
            .with_status(400)
            .with_body(r#"{"message":"400 (Bad request) \"title\" not given"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/v4/user")
            .with_status(401)
            .with_body(r#"{"message":"401 Unauthorized"}"#)
            .create_async()
            .await;

        let client = static_client(&server.url(), TokenType::Bearer, "t");

        let err = client
            .invoke_with_credential(Method::POST, "projects/1/issues", &())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), r#"400 (Bad request) "title" not given"#);
        assert_eq!(status_for_error(&err), Some(StatusCode::BAD_REQUEST));

        let err = client
            .invoke_with_credential(Method::GET, "user", &())
            .await
            .unwrap_err();
        assert!(is_unauthorized(&err));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v4/version")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = static_client(&server.url(), TokenType::Bearer, "t");
        let err = client
            .get::<serde_json::Value>("version", &())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode { ref endpoint, .. } if endpoint == "version"));
    }

    #[tokio::test]
    async fn test_transport_error_classifies_as_nothing() {
        let client = static_client("http://127.0.0.1:9", TokenType::Bearer, "t");
        let err = client
            .invoke_with_credential(Method::GET, "user", &())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert!(!is_not_found(&err));
        assert!(!is_unauthorized(&err));
        assert_eq!(status_for_error(&err), None);
    }

    #[tokio::test]
    async fn test_deadline_elapses() {
        let err = with_timeout(Duration::from_millis(10), std::future::pending::<Result<()>>())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout));
        assert!(is_timeout(&err));
    }

    #[derive(Debug, Default)]
    struct CountingLimiter(AtomicUsize);

    #[async_trait]
    impl RateLimiter for CountingLimiter {
        async fn acquire(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_rate_limiter_awaited_per_request() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v4/version")
            .with_status(200)
            .with_body(r#"{"version":"17.0.0","revision":"abc"}"#)
            .expect(3)
            .create_async()
            .await;

        let limiter = Arc::new(CountingLimiter::default());
        let client = GitlabClient::new(
            Some(Credential::static_token(server.url(), TokenType::Bearer, "t")),
            ClientOptions::default().with_rate_limiter(limiter.clone()),
        )
        .unwrap();

        for _ in 0..3 {
            client.invoke_with_credential(Method::GET, "version", &()).await.unwrap();
        }

        assert_eq!(limiter.0.load(Ordering::SeqCst), 3);
    }
}
