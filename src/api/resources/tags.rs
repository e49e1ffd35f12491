//
//  gitlab-client
//  api/resources/tags.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Repository tags API
//!
//! - `GET /projects/:id/repository/tags`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{path_segment, Commit};
use crate::api::client::GitlabClient;
use crate::api::common::{ListOptions, Query, Records, RequestOptions, Result};

/// A repository tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub name: String,
    pub message: Option<String>,
    pub target: String,
    pub protected: bool,
    pub commit: Option<Commit>,
    pub release: Option<ReleaseNote>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseNote {
    pub tag_name: String,
    pub description: String,
}

/// Filters for [`Tags::list`].
#[derive(Debug, Clone, Default)]
pub struct ListTagsOptions {
    pub list: ListOptions,
    pub search: Option<String>,
}

impl RequestOptions for ListTagsOptions {
    fn append_query(&self, query: &mut Query) {
        self.list.append_query(query);
        query.push_opt("search", self.search.as_deref());
    }
}

/// Tag operations.
pub struct Tags<'a> {
    client: &'a GitlabClient,
}

impl<'a> Tags<'a> {
    pub(crate) fn new(client: &'a GitlabClient) -> Self {
        Self { client }
    }

    /// Lists tags of a project.
    pub async fn list(&self, project: &str, options: &ListTagsOptions) -> Result<Records<Tag>> {
        let path = format!("projects/{}/repository/tags", path_segment(project));
        self.client.list(&path, &options.list, options).await
    }
}
