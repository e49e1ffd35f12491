//
//  gitlab-client
//  cli/branch.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Branch commands.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::api::common::{ListOptions, MAX_PER_PAGE};
use crate::api::resources::{Branch, CreateBranchOptions, ListBranchesOptions};
use crate::output::{format_bool, print_field, print_header, truncate, TableOutput, TableRow};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct BranchCommand {
    #[command(subcommand)]
    pub command: BranchSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BranchSubcommand {
    /// List branches
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Create a branch
    Create(CreateArgs),

    /// Delete a branch, or every merged branch
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project id or namespace/path
    pub project: String,

    /// Only branches containing this term
    #[arg(long, short)]
    pub search: Option<String>,

    /// Maximum number of branches to show
    #[arg(long, short = 'L', default_value = "30")]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project id or namespace/path
    pub project: String,

    /// Name of the new branch
    pub branch: String,

    /// Branch name or commit SHA to start from
    #[arg(long = "ref", default_value = "main")]
    pub git_ref: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Project id or namespace/path
    pub project: String,

    /// Branch to delete
    #[arg(required_unless_present = "merged", conflicts_with = "merged")]
    pub branch: Option<String>,

    /// Delete every branch merged into the default branch
    #[arg(long)]
    pub merged: bool,
}

impl TableRow for Branch {
    fn headers() -> &'static [&'static str] {
        &["BRANCH", "COMMIT", "DEFAULT", "PROTECTED", "MESSAGE"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        let (short_id, title) = self
            .commit
            .as_ref()
            .map(|c| (c.short_id.clone(), c.title.clone()))
            .unwrap_or_default();
        vec![
            self.name.clone(),
            short_id,
            format_bool(self.default, color),
            format_bool(self.protected, color),
            truncate(&title, 50),
        ]
    }
}

impl TableOutput for Branch {
    fn print_table(&self, color: bool) {
        print_header(&self.name);
        if let Some(commit) = &self.commit {
            print_field("Commit", &commit.id, color);
            print_field("Message", &commit.title, color);
        }
        print_field("Protected", &format_bool(self.protected, color), color);
        print_field("URL", &self.web_url, color);
    }
}

impl BranchCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            BranchSubcommand::List(args) => list(args, global).await,
            BranchSubcommand::Create(args) => create(args, global).await,
            BranchSubcommand::Delete(args) => delete(args, global).await,
        }
    }
}

async fn list(args: &ListArgs, global: &GlobalOptions) -> Result<()> {
    let client = global.client()?;
    let per_page = (args.limit.max(1) as u32).min(MAX_PER_PAGE);
    let mut options = ListBranchesOptions {
        search: args.search.clone(),
        ..ListBranchesOptions::from(ListOptions::offset(1, per_page))
    };

    let mut branches = Vec::new();
    loop {
        let page = client.branches().list(&args.project, &options).await?;
        let next = page.next_options();
        branches.extend(page.into_items());
        if branches.len() >= args.limit {
            branches.truncate(args.limit);
            break;
        }
        match next {
            Some(list) => options.list = list,
            None => break,
        }
    }

    if branches.is_empty() && !global.json {
        println!("No branches found");
        return Ok(());
    }
    global.output().write_list(&branches)
}

async fn create(args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
    let client = global.client()?;
    let branch = client
        .branches()
        .create(&args.project, &CreateBranchOptions::new(&args.branch, &args.git_ref))
        .await?;

    let output = global.output();
    output.write_success(&format!("Created branch {} from {}", branch.name, args.git_ref));
    if global.json {
        output.write(&branch)?;
    }
    Ok(())
}

async fn delete(args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
    let client = global.client()?;
    let output = global.output();

    if args.merged {
        client.branches().delete_merged(&args.project).await?;
        output.write_success("Scheduled deletion of merged branches");
        return Ok(());
    }
    let Some(branch) = &args.branch else {
        bail!("Pass a branch name or --merged");
    };
    client.branches().delete(&args.project, branch).await?;
    output.write_success(&format!("Deleted branch {branch}"));
    Ok(())
}
