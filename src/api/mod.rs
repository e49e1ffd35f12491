//
//  gitlab-client
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module provides the HTTP client for GitLab's REST API (`/api/v4`).
//!
//! ## Architecture
//!
//! - [`client`]: The invocation pipeline: URL building, request encoding,
//!   auth injection and response decoding
//! - [`common`]: Shared types (errors, query builder, pagination, records)
//! - [`resources`]: Typed per-resource operations built on the client
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gitlab_client::api::resources::ListBranchesOptions;
//! use gitlab_client::auth::{Credential, TokenType};
//! use gitlab_client::{ClientOptions, GitlabClient};
//!
//! # async fn example() -> gitlab_client::Result<()> {
//! let client = GitlabClient::new(
//!     Some(Credential::static_token("https://gitlab.example.com", TokenType::Private, "glpat-xxxx")),
//!     ClientOptions::default(),
//! )?;
//!
//! let branches = client
//!     .branches()
//!     .list("group/project", &ListBranchesOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`common::Error`]. Non-2xx responses become
//! [`common::Error::Api`]; classify them with [`common::is_not_found`],
//! [`common::is_forbidden`], [`common::is_unauthorized`] and
//! [`common::is_timeout`].

pub mod client;
pub mod common;
pub mod resources;

pub use client::{
    with_deadline, with_timeout, ClientOptions, GitlabClient, RateLimiter, Reply, CLOUD_ENDPOINT,
    DEFAULT_API_VERSION,
};
