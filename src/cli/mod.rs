//
//  gitlab-client
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod auth;
mod branch;
mod project;
mod version;

pub use auth::AuthCommand;
pub use branch::BranchCommand;
pub use project::ProjectCommand;
pub use version::VersionCommand;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::api::GitlabClient;
use crate::config::{Config, ResolvedHost};
use crate::output::{OutputFormat, OutputWriter};

/// Work with GitLab from the command line
#[derive(Parser, Debug)]
#[command(
    name = "gl",
    version,
    about = "Work with GitLab from the command line",
    long_about = "gl is a small CLI over the gitlab-client library.\n\n\
                  It lists projects and branches, manages branches and walks \
                  through the OAuth authorization-code flow.",
    propagate_version = true,
    after_help = "Use 'gl <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Options accepted by every command.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// GitLab host or base URL (e.g. gitlab.example.com, http://localhost:8080)
    #[arg(long, global = true, env = "GITLAB_HOST")]
    pub host: Option<String>,

    /// Access token, overriding the configured one
    #[arg(long, global = true, env = "GITLAB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Log requests to stderr
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalOptions {
    pub fn output(&self) -> OutputWriter {
        OutputWriter::new(OutputFormat::from_json_flag(self.json))
    }

    /// Loads the configuration and applies `--host` and `--token`.
    pub fn resolve_host(&self) -> Result<ResolvedHost> {
        let config = Config::load()?;
        Ok(config.resolve(self.host.as_deref(), self.token.as_deref()))
    }

    /// A client for the resolved host.
    pub fn client(&self) -> Result<GitlabClient> {
        let host = self.resolve_host()?;
        client_for(&host, self.debug)
    }
}

pub(crate) fn client_for(host: &ResolvedHost, debug: bool) -> Result<GitlabClient> {
    GitlabClient::new(host.credential(), host.client_options(debug))
        .with_context(|| format!("Failed to create client for {}", host.name))
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authorize with OAuth and inspect the active credential
    Auth(AuthCommand),

    /// List and view projects
    #[command(visible_alias = "proj")]
    Project(ProjectCommand),

    /// List, create and delete branches
    Branch(BranchCommand),

    /// Show gl and GitLab instance versions
    Version(VersionCommand),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Auth(cmd) => cmd.run(&self.global).await,
            Commands::Project(cmd) => cmd.run(&self.global).await,
            Commands::Branch(cmd) => cmd.run(&self.global).await,
            Commands::Version(cmd) => cmd.run(&self.global).await,
        }
    }
}
