//
//  gitlab-client
//  api/resources/branches.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Repository branches API
//!
//! - `GET /projects/:id/repository/branches`
//! - `POST /projects/:id/repository/branches`
//! - `DELETE /projects/:id/repository/branches/:branch`
//! - `DELETE /projects/:id/repository/merged_branches`

use serde::{Deserialize, Serialize};

use super::{path_segment, Commit};
use crate::api::client::GitlabClient;
use crate::api::common::{json_body_options, ListOptions, Query, Records, RequestOptions, Result};

/// A repository branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branch {
    pub name: String,
    pub commit: Option<Commit>,
    pub merged: bool,
    pub protected: bool,
    pub default: bool,
    pub can_push: bool,
    pub developers_can_push: bool,
    pub developers_can_merge: bool,
    pub web_url: String,
}

/// Filters for [`Branches::list`].
#[derive(Debug, Clone, Default)]
pub struct ListBranchesOptions {
    pub list: ListOptions,
    pub search: Option<String>,
    pub regex: Option<String>,
}

impl From<ListOptions> for ListBranchesOptions {
    fn from(list: ListOptions) -> Self {
        Self {
            list,
            ..Self::default()
        }
    }
}

impl RequestOptions for ListBranchesOptions {
    fn append_query(&self, query: &mut Query) {
        self.list.append_query(query);
        query
            .push_opt("search", self.search.as_deref())
            .push_opt("regex", self.regex.as_deref());
    }
}

/// Body for [`Branches::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateBranchOptions {
    /// Name of the new branch.
    pub branch: String,
    /// Branch name or commit SHA to start from.
    #[serde(rename = "ref")]
    pub git_ref: String,
}

impl CreateBranchOptions {
    pub fn new(branch: impl Into<String>, git_ref: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            git_ref: git_ref.into(),
        }
    }
}

json_body_options!(CreateBranchOptions);

/// Branch operations.
pub struct Branches<'a> {
    client: &'a GitlabClient,
}

impl<'a> Branches<'a> {
    pub(crate) fn new(client: &'a GitlabClient) -> Self {
        Self { client }
    }

    /// Lists branches of a project, sorted by name.
    pub async fn list(&self, project: &str, options: &ListBranchesOptions) -> Result<Records<Branch>> {
        let path = format!("projects/{}/repository/branches", path_segment(project));
        self.client.list(&path, &options.list, options).await
    }

    /// Creates a branch.
    pub async fn create(&self, project: &str, options: &CreateBranchOptions) -> Result<Branch> {
        let path = format!("projects/{}/repository/branches", path_segment(project));
        self.client.post(&path, options).await
    }

    /// Deletes one branch.
    pub async fn delete(&self, project: &str, branch: &str) -> Result<()> {
        let path = format!(
            "projects/{}/repository/branches/{}",
            path_segment(project),
            path_segment(branch)
        );
        self.client.delete(&path, &()).await
    }

    /// Deletes every branch already merged into the default branch.
    pub async fn delete_merged(&self, project: &str) -> Result<()> {
        let path = format!("projects/{}/repository/merged_branches", path_segment(project));
        self.client.delete(&path, &()).await
    }
}
