//
//  gitlab-client
//  cli/version.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `gl version`

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tracing::debug;

use crate::api::with_timeout;
use crate::output::{print_field, TableOutput};

use super::GlobalOptions;

const INSTANCE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Args, Debug)]
pub struct VersionCommand {
    /// Skip querying the GitLab instance
    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    client: &'static str,
    host: Option<String>,
    gitlab: Option<String>,
    revision: Option<String>,
}

impl TableOutput for VersionInfo {
    fn print_table(&self, color: bool) {
        println!("{} version {}", crate::APP_NAME, self.client);
        if let (Some(host), Some(gitlab)) = (&self.host, &self.gitlab) {
            print_field(host, gitlab, color);
        }
    }
}

impl VersionCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut info = VersionInfo {
            client: crate::VERSION,
            host: None,
            gitlab: None,
            revision: None,
        };

        if !self.offline {
            let host = global.resolve_host()?;
            if host.credential().is_some() {
                let client = super::client_for(&host, global.debug)?;
                match with_timeout(INSTANCE_TIMEOUT, client.instance().version()).await {
                    Ok(version) => {
                        info.host = Some(host.name);
                        info.gitlab = Some(version.version);
                        info.revision = Some(version.revision);
                    }
                    Err(e) => debug!(error = %e, "Instance version unavailable"),
                }
            }
        }

        global.output().write(&info)
    }
}
