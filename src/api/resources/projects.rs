//
//  gitlab-client
//  api/resources/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Projects API
//!
//! - `GET /projects`
//! - `GET /projects/:id`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{path_segment, AccessLevel, BasicUser, Visibility};
use crate::api::client::GitlabClient;
use crate::api::common::{ListOptions, Query, Records, RequestOptions, Result};

/// A GitLab project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub name_with_namespace: String,
    pub path: String,
    pub path_with_namespace: String,
    pub description: Option<String>,
    pub default_branch: Option<String>,
    pub visibility: Visibility,
    pub ssh_url_to_repo: String,
    pub http_url_to_repo: String,
    pub web_url: String,
    pub readme_url: Option<String>,
    pub topics: Vec<String>,
    pub owner: Option<BasicUser>,
    pub namespace: Option<ProjectNamespace>,
    pub permissions: Option<Permissions>,
    pub statistics: Option<ProjectStatistics>,
    pub archived: bool,
    pub empty_repo: bool,
    pub forks_count: u64,
    pub star_count: u64,
    pub open_issues_count: u64,
    pub issues_enabled: bool,
    pub merge_requests_enabled: bool,
    pub creator_id: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// Namespace a project lives in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectNamespace {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub kind: String,
    pub full_path: String,
    pub parent_id: Option<u64>,
    pub web_url: String,
}

/// The caller's access to a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub project_access: Option<MemberAccess>,
    pub group_access: Option<MemberAccess>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberAccess {
    pub access_level: AccessLevel,
    pub notification_level: u8,
}

/// Storage statistics, present when requested with `statistics=true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectStatistics {
    pub commit_count: u64,
    pub storage_size: u64,
    pub repository_size: u64,
    pub wiki_size: u64,
    pub lfs_objects_size: u64,
    pub job_artifacts_size: u64,
}

/// Filters for [`Projects::list`].
#[derive(Debug, Clone, Default)]
pub struct ListProjectsOptions {
    pub list: ListOptions,
    pub archived: Option<bool>,
    pub membership: Option<bool>,
    pub owned: Option<bool>,
    pub starred: Option<bool>,
    pub simple: Option<bool>,
    pub statistics: Option<bool>,
    pub search: Option<String>,
    pub topic: Option<String>,
    pub visibility: Option<Visibility>,
    pub min_access_level: Option<AccessLevel>,
    pub with_programming_language: Option<String>,
    pub last_activity_after: Option<DateTime<Utc>>,
    pub last_activity_before: Option<DateTime<Utc>>,
}

impl From<ListOptions> for ListProjectsOptions {
    fn from(list: ListOptions) -> Self {
        Self {
            list,
            ..Self::default()
        }
    }
}

impl RequestOptions for ListProjectsOptions {
    fn append_query(&self, query: &mut Query) {
        self.list.append_query(query);
        query
            .push_opt("archived", self.archived)
            .push_opt("membership", self.membership)
            .push_opt("owned", self.owned)
            .push_opt("starred", self.starred)
            .push_opt("simple", self.simple)
            .push_opt("statistics", self.statistics)
            .push_opt("search", self.search.as_deref())
            .push_opt("topic", self.topic.as_deref())
            .push_opt("visibility", self.visibility)
            .push_opt("min_access_level", self.min_access_level.map(|l| l.0))
            .push_opt(
                "with_programming_language",
                self.with_programming_language.as_deref(),
            )
            .push_time("last_activity_after", self.last_activity_after.as_ref())
            .push_time("last_activity_before", self.last_activity_before.as_ref());
    }
}

/// Options for [`Projects::get`].
#[derive(Debug, Clone, Default)]
pub struct GetProjectOptions {
    pub statistics: Option<bool>,
    pub license: Option<bool>,
    pub with_custom_attributes: Option<bool>,
}

impl RequestOptions for GetProjectOptions {
    fn append_query(&self, query: &mut Query) {
        query
            .push_opt("statistics", self.statistics)
            .push_opt("license", self.license)
            .push_opt("with_custom_attributes", self.with_custom_attributes);
    }
}

/// Project operations.
pub struct Projects<'a> {
    client: &'a GitlabClient,
}

impl<'a> Projects<'a> {
    pub(crate) fn new(client: &'a GitlabClient) -> Self {
        Self { client }
    }

    /// Lists projects visible to the authenticated user.
    pub async fn list(&self, options: &ListProjectsOptions) -> Result<Records<Project>> {
        self.client.list("projects", &options.list, options).await
    }

    /// Gets one project by id or `namespace/path`.
    pub async fn get(&self, project: &str, options: &GetProjectOptions) -> Result<Project> {
        let path = format!("projects/{}", path_segment(project));
        self.client.get(&path, options).await
    }
}
