//
//  gitlab-client
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # gitlab-client
//!
//! A typed client for the GitLab REST API, plus the `gl` command-line tool
//! built on it.
//!
//! ## Modules
//!
//! - [`api`]: The client, shared types and per-resource operations
//! - [`auth`]: Credentials, the OAuth token flow and the token cache
//! - [`config`]: The `gl` configuration file
//! - [`cli`]: `gl` command definitions
//! - [`output`]: Table and JSON rendering for `gl`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gitlab_client::api::resources::ListProjectsOptions;
//! use gitlab_client::{ClientOptions, Credential, GitlabClient, ListOptions, TokenType};
//!
//! # async fn example() -> gitlab_client::Result<()> {
//! let client = GitlabClient::new(
//!     Some(Credential::static_token("https://gitlab.com", TokenType::Private, "glpat-xxxx")),
//!     ClientOptions::default(),
//! )?;
//!
//! let mut options = ListProjectsOptions::from(ListOptions::offset(1, 50));
//! loop {
//!     let page = client.projects().list(&options).await?;
//!     for project in page.iter() {
//!         println!("{}", project.path_with_namespace);
//!     }
//!     match page.next_options() {
//!         Some(next) => options.list = next,
//!         None => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;

pub mod auth;

pub mod cli;

pub mod config;

pub mod output;

pub use api::common::{Error, ListOptions, PageInfo, Records, Result, Sort};
pub use api::{ClientOptions, GitlabClient};
pub use auth::{Credential, TokenType};
pub use cli::Cli;
pub use config::Config;

/// Name of the command-line tool and of its configuration directory.
pub const APP_NAME: &str = "gl";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process exit codes used by `gl`.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;

    /// Unclassified failure. Details go to stderr.
    pub const ERROR: i32 = 1;

    /// Invalid arguments. Raised by clap.
    pub const USAGE: i32 = 2;

    /// No credential, or the server rejected it.
    pub const AUTH_ERROR: i32 = 4;

    /// The project, branch or other resource does not exist or is hidden.
    pub const NOT_FOUND: i32 = 8;
}
