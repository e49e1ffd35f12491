//
//  gitlab-client
//  cli/project.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::debug;

use crate::api::common::{ListOptions, Sort, MAX_PER_PAGE};
use crate::api::resources::{GetProjectOptions, ListProjectsOptions, Project};
use crate::output::{format_visibility, print_field, print_header, truncate, TableOutput, TableRow};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// List projects
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View a project
    View(ViewArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only projects matching this search term
    #[arg(long, short)]
    pub search: Option<String>,

    /// Only projects owned by the current user
    #[arg(long)]
    pub owned: bool,

    /// Only projects the current user is a member of
    #[arg(long)]
    pub membership: bool,

    /// Maximum number of projects to show
    #[arg(long, short = 'L', default_value = "30")]
    pub limit: usize,

    /// Fetch every page, ignoring --limit
    #[arg(long)]
    pub all: bool,

    /// Use keyset pagination ordered by id
    #[arg(long)]
    pub keyset: bool,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Project id or namespace/path
    pub project: String,

    /// Include repository statistics
    #[arg(long)]
    pub statistics: bool,
}

impl TableRow for Project {
    fn headers() -> &'static [&'static str] {
        &["ID", "PROJECT", "VISIBILITY", "DESCRIPTION"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.path_with_namespace.clone(),
            format_visibility(self.visibility.as_str(), color),
            truncate(self.description.as_deref().unwrap_or(""), 50),
        ]
    }
}

impl TableOutput for Project {
    fn print_table(&self, color: bool) {
        print_header(&self.path_with_namespace);
        print_field("ID", &self.id.to_string(), color);
        print_field("Visibility", &format_visibility(self.visibility.as_str(), color), color);
        if let Some(branch) = &self.default_branch {
            print_field("Default branch", branch, color);
        }
        if let Some(desc) = self.description.as_deref().filter(|d| !d.is_empty()) {
            print_field("Description", desc, color);
        }
        print_field("Stars", &self.star_count.to_string(), color);
        print_field("Forks", &self.forks_count.to_string(), color);
        if let Some(stats) = &self.statistics {
            print_field("Commits", &stats.commit_count.to_string(), color);
            print_field("Repo size", &format!("{} bytes", stats.repository_size), color);
        }
        if let Some(activity) = self.last_activity_at {
            print_field("Last activity", &activity.format("%Y-%m-%d %H:%M").to_string(), color);
        }
        println!();
        print_field("URL", &self.web_url, color);
        print_field("Clone", &self.ssh_url_to_repo, color);
    }
}

impl ProjectCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ProjectSubcommand::List(args) => list(args, global).await,
            ProjectSubcommand::View(args) => view(args, global).await,
        }
    }
}

async fn list(args: &ListArgs, global: &GlobalOptions) -> Result<()> {
    let client = global.client()?;

    let per_page = if args.all {
        MAX_PER_PAGE
    } else {
        (args.limit.max(1) as u32).min(MAX_PER_PAGE)
    };
    let list = if args.keyset {
        ListOptions::keyset("id", Sort::Asc, per_page)
    } else {
        ListOptions::offset(1, per_page)
    };
    let mut options = ListProjectsOptions {
        search: args.search.clone(),
        owned: args.owned.then_some(true),
        membership: args.membership.then_some(true),
        ..ListProjectsOptions::from(list)
    };

    let mut projects = Vec::new();
    loop {
        let page = client.projects().list(&options).await?;
        let next = page.next_options();
        projects.extend(page.into_items());

        if !args.all && projects.len() >= args.limit {
            projects.truncate(args.limit);
            break;
        }
        match next {
            Some(list) => {
                debug!(fetched = projects.len(), "Fetching next page");
                options.list = list;
            }
            None => break,
        }
    }

    let output = global.output();
    if projects.is_empty() && !global.json {
        println!("No projects found");
        return Ok(());
    }
    output.write_list(&projects)
}

async fn view(args: &ViewArgs, global: &GlobalOptions) -> Result<()> {
    let client = global.client()?;
    let options = GetProjectOptions {
        statistics: args.statistics.then_some(true),
        ..GetProjectOptions::default()
    };
    let project = client.projects().get(&args.project, &options).await?;
    global.output().write(&project)
}
