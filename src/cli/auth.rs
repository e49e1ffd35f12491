//
//  gitlab-client
//  cli/auth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Authentication commands.
//!
//! `gl auth url` prints the OAuth authorize URL for the configured
//! application, `gl auth token` exchanges a code (or the saved refresh
//! token) and saves the result, and `gl auth status` checks the active
//! credential against `GET /user`.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::common::Error;
use crate::api::GitlabClient;
use crate::auth::{authorize_url, Credential, TokenRequest, TokenType};
use crate::config::{Config, ResolvedHost};
use crate::output::{print_field, print_header, TableOutput};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Print the OAuth authorization URL
    Url(UrlArgs),

    /// Exchange an authorization code or refresh the saved token
    Token(TokenArgs),

    /// Check the active credential
    Status,
}

#[derive(Args, Debug)]
pub struct UrlArgs {
    /// Space-separated OAuth scopes
    #[arg(long, default_value = "api")]
    pub scope: String,

    /// Open the URL in the browser
    #[arg(long, short)]
    pub web: bool,
}

#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Authorization code from the redirect
    #[arg(long, conflicts_with = "refresh")]
    pub code: Option<String>,

    /// Use the saved refresh token
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
struct AuthStatus {
    host: String,
    endpoint: String,
    credential: Option<&'static str>,
    username: Option<String>,
    error: Option<String>,
}

impl TableOutput for AuthStatus {
    fn print_table(&self, color: bool) {
        print_header(&self.host);
        print_field("Endpoint", &self.endpoint, color);
        print_field("Credential", self.credential.unwrap_or("none"), color);
        match (&self.username, &self.error) {
            (Some(username), _) => print_field("Logged in as", username, color),
            (None, Some(error)) => print_field("Status", error, color),
            (None, None) => print_field("Status", "Not logged in", color),
        }
    }
}

impl AuthCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            AuthSubcommand::Url(args) => url(args, global),
            AuthSubcommand::Token(args) => token(args, global).await,
            AuthSubcommand::Status => status(global).await,
        }
    }
}

/// The configured OAuth application for `host`, ignoring any token.
fn application(host: &ResolvedHost) -> Result<(String, String, String)> {
    let config = &host.config;
    match (&config.client_id, &config.client_secret, &config.redirect_uri) {
        (Some(id), Some(secret), Some(redirect)) => {
            Ok((id.clone(), secret.clone(), redirect.clone()))
        }
        _ => bail!(
            "No OAuth application configured for {}. Set client_id, client_secret and redirect_uri in {}",
            host.name,
            Config::config_path()?.display()
        ),
    }
}

fn url(args: &UrlArgs, global: &GlobalOptions) -> Result<()> {
    let host = global.resolve_host()?;
    let (client_id, _, redirect_uri) = application(&host)?;
    let url = authorize_url(&host.endpoint(), &client_id, &redirect_uri, &args.scope)?;

    println!("{url}");
    if args.web {
        webbrowser::open(url.as_str()).context("Failed to open browser")?;
    }
    Ok(())
}

async fn token(args: &TokenArgs, global: &GlobalOptions) -> Result<()> {
    let mut config = Config::load()?;
    let host = config.resolve(global.host.as_deref(), None);
    let (client_id, client_secret, redirect_uri) = application(&host)?;

    let request = match (&args.code, args.refresh) {
        (Some(code), _) => TokenRequest::with_code(code),
        (None, true) => match &host.config.refresh_token {
            Some(refresh_token) => TokenRequest::with_refresh_token(refresh_token),
            None => bail!("No refresh token saved for {}. Run 'gl auth token --code <CODE>'", host.name),
        },
        (None, false) => bail!("Pass --code <CODE> or --refresh"),
    };

    let credential =
        Credential::authorization_code(host.endpoint(), client_id, client_secret, redirect_uri);
    let client = GitlabClient::new(Some(credential), host.client_options(global.debug))?;
    let grant = client.oauth().access_token(&request).await?;
    let Some(access_token) = grant.token() else {
        bail!("The server did not issue a token");
    };

    let entry = config.host_config_mut(&host.name);
    entry.token = Some(access_token.access_token.clone());
    entry.token_type = TokenType::Bearer;
    if let Some(refresh_token) = &access_token.refresh_token {
        entry.refresh_token = Some(refresh_token.clone());
    }
    config.save()?;

    global
        .output()
        .write_success(&format!("Token saved for {}", host.name));
    Ok(())
}

async fn status(global: &GlobalOptions) -> Result<()> {
    let host = global.resolve_host()?;
    let credential = host.credential();
    let mut status = AuthStatus {
        host: host.name.clone(),
        endpoint: host.endpoint(),
        credential: credential.as_ref().map(Credential::kind),
        username: None,
        error: None,
    };

    if credential.is_some() {
        let client = super::client_for(&host, global.debug)?;
        match client.users().current().await {
            Ok(user) => status.username = Some(user.username),
            Err(e) => status.error = Some(e.to_string()),
        }
    }

    global.output().write(&status)?;
    if status.username.is_none() {
        return Err(Error::Auth(format!("Not logged in to {}", status.host)).into());
    }
    Ok(())
}
