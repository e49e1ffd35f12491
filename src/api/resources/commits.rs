//
//  gitlab-client
//  api/resources/commits.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Repository commits API
//!
//! - `GET /projects/:id/repository/commits`

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{path_segment, PipelineInfo};
use crate::api::client::GitlabClient;
use crate::api::common::{ListOptions, Query, Records, RequestOptions, Result};

/// A repository commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commit {
    pub id: String,
    pub short_id: String,
    pub title: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub authored_date: Option<DateTime<Utc>>,
    pub committer_name: String,
    pub committer_email: String,
    pub committed_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub parent_ids: Vec<String>,
    pub stats: Option<CommitStats>,
    pub status: Option<String>,
    pub last_pipeline: Option<PipelineInfo>,
    pub project_id: Option<u64>,
    pub trailers: BTreeMap<String, String>,
    pub web_url: String,
}

/// Line counts, present when listed with `with_stats=true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitStats {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

/// Filters for [`Commits::list`].
#[derive(Debug, Clone, Default)]
pub struct ListCommitsOptions {
    pub list: ListOptions,
    pub ref_name: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub author: Option<String>,
    pub all: Option<bool>,
    pub with_stats: Option<bool>,
    pub first_parent: Option<bool>,
    pub trailers: Option<bool>,
}

impl RequestOptions for ListCommitsOptions {
    fn append_query(&self, query: &mut Query) {
        self.list.append_query(query);
        query
            .push_opt("ref_name", self.ref_name.as_deref())
            .push_time("since", self.since.as_ref())
            .push_time("until", self.until.as_ref())
            .push_opt("path", self.path.as_deref())
            .push_opt("author", self.author.as_deref())
            .push_opt("all", self.all)
            .push_opt("with_stats", self.with_stats)
            .push_opt("first_parent", self.first_parent)
            .push_opt("trailers", self.trailers);
    }
}

/// Commit operations.
pub struct Commits<'a> {
    client: &'a GitlabClient,
}

impl<'a> Commits<'a> {
    pub(crate) fn new(client: &'a GitlabClient) -> Self {
        Self { client }
    }

    /// Lists commits of a project, newest first.
    pub async fn list(&self, project: &str, options: &ListCommitsOptions) -> Result<Records<Commit>> {
        let path = format!("projects/{}/repository/commits", path_segment(project));
        self.client.list(&path, &options.list, options).await
    }
}
