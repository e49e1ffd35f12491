//
//  gitlab-client
//  api/resources/groups.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Groups API
//!
//! - `GET /groups`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccessLevel, Visibility};
use crate::api::client::GitlabClient;
use crate::api::common::{ListOptions, Query, Records, RequestOptions, Result};

/// A GitLab group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub full_name: String,
    pub full_path: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub web_url: String,
    pub avatar_url: Option<String>,
    pub parent_id: Option<u64>,
    pub default_branch: Option<String>,
    pub request_access_enabled: bool,
    pub require_two_factor_authentication: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Filters for [`Groups::list`].
#[derive(Debug, Clone, Default)]
pub struct ListGroupsOptions {
    pub list: ListOptions,
    pub skip_groups: Vec<u64>,
    pub all_available: Option<bool>,
    pub search: Option<String>,
    pub statistics: Option<bool>,
    pub owned: Option<bool>,
    pub min_access_level: Option<AccessLevel>,
    pub top_level_only: Option<bool>,
}

impl RequestOptions for ListGroupsOptions {
    fn append_query(&self, query: &mut Query) {
        self.list.append_query(query);
        query
            .push_list("skip_groups", &self.skip_groups)
            .push_opt("all_available", self.all_available)
            .push_opt("search", self.search.as_deref())
            .push_opt("statistics", self.statistics)
            .push_opt("owned", self.owned)
            .push_opt("min_access_level", self.min_access_level.map(|l| l.0))
            .push_opt("top_level_only", self.top_level_only);
    }
}

/// Group operations.
pub struct Groups<'a> {
    client: &'a GitlabClient,
}

impl<'a> Groups<'a> {
    pub(crate) fn new(client: &'a GitlabClient) -> Self {
        Self { client }
    }

    /// Lists groups visible to the authenticated user.
    pub async fn list(&self, options: &ListGroupsOptions) -> Result<Records<Group>> {
        self.client.list("groups", &options.list, options).await
    }
}
