//
//  gitlab-client
//  api/resources/merge_requests.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Merge requests API
//!
//! - `POST /projects/:id/merge_requests`
//! - `PUT /projects/:id/merge_requests/:iid/merge`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{path_segment, BasicUser, PipelineInfo};
use crate::api::client::GitlabClient;
use crate::api::common::{json_body_options, Result};

/// A merge request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeRequest {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    pub description: Option<String>,
    pub state: String,
    pub source_branch: String,
    pub target_branch: String,
    pub source_project_id: u64,
    pub target_project_id: u64,
    pub labels: Vec<String>,
    pub draft: bool,
    pub author: Option<BasicUser>,
    pub assignees: Vec<BasicUser>,
    pub reviewers: Vec<BasicUser>,
    pub merged_by: Option<BasicUser>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub detailed_merge_status: String,
    pub merge_when_pipeline_succeeds: bool,
    pub sha: Option<String>,
    pub merge_commit_sha: Option<String>,
    pub squash_commit_sha: Option<String>,
    pub squash: bool,
    pub should_remove_source_branch: Option<bool>,
    pub force_remove_source_branch: Option<bool>,
    pub has_conflicts: bool,
    pub pipeline: Option<PipelineInfo>,
    pub reference: String,
    pub web_url: String,
}

/// Body for [`MergeRequests::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateMergeRequestOptions {
    pub title: String,
    pub source_branch: String,
    pub target_branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Comma-separated label names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignee_ids: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reviewer_ids: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_source_branch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squash: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_collaboration: Option<bool>,
}

impl CreateMergeRequestOptions {
    pub fn new(
        source_branch: impl Into<String>,
        target_branch: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            source_branch: source_branch.into(),
            target_branch: target_branch.into(),
            ..Self::default()
        }
    }
}

/// Body for [`MergeRequests::accept`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AcceptMergeRequestOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_commit_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squash_commit_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squash: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_remove_source_branch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_when_pipeline_succeeds: Option<bool>,
    /// Merge only if the source branch head still matches this SHA.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

json_body_options!(CreateMergeRequestOptions, AcceptMergeRequestOptions);

/// Merge request operations.
pub struct MergeRequests<'a> {
    client: &'a GitlabClient,
}

impl<'a> MergeRequests<'a> {
    pub(crate) fn new(client: &'a GitlabClient) -> Self {
        Self { client }
    }

    /// Opens a merge request.
    pub async fn create(
        &self,
        project: &str,
        options: &CreateMergeRequestOptions,
    ) -> Result<MergeRequest> {
        let path = format!("projects/{}/merge_requests", path_segment(project));
        self.client.post(&path, options).await
    }

    /// Merges a merge request.
    pub async fn accept(
        &self,
        project: &str,
        iid: u64,
        options: &AcceptMergeRequestOptions,
    ) -> Result<MergeRequest> {
        let path = format!("projects/{}/merge_requests/{}/merge", path_segment(project), iid);
        self.client.put(&path, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ClientOptions;
    use crate::auth::{Credential, TokenType};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(server: &Server) -> GitlabClient {
        GitlabClient::new(
            Some(Credential::static_token(server.url(), TokenType::Private, "t")),
            ClientOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_sends_only_set_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v4/projects/4/merge_requests")
            .match_body(Matcher::Json(json!({
                "title": "Add login",
                "source_branch": "feature/login",
                "target_branch": "main",
                "labels": "auth,ui",
                "remove_source_branch": true
            })))
            .with_status(201)
            .with_body(
                r#"{"id": 84, "iid": 1, "project_id": 4, "title": "Add login", "state": "opened",
                    "source_branch": "feature/login", "target_branch": "main",
                    "labels": ["auth", "ui"], "author": {"id": 1, "username": "admin"}}"#,
            )
            .create_async()
            .await;

        let options = CreateMergeRequestOptions {
            labels: Some("auth,ui".to_string()),
            remove_source_branch: Some(true),
            ..CreateMergeRequestOptions::new("feature/login", "main", "Add login")
        };
        let mr = client(&server)
            .merge_requests()
            .create("4", &options)
            .await
            .unwrap();

        assert_eq!(mr.iid, 1);
        assert_eq!(mr.labels, vec!["auth", "ui"]);
        assert_eq!(mr.author.unwrap().username, "admin");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_accept_conflict_message() {
        let mut server = Server::new_async().await;
        server
            .mock("PUT", "/api/v4/projects/4/merge_requests/1/merge")
            .with_status(409)
            .with_body(r#"{"message":"SHA does not match HEAD of source branch"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .merge_requests()
            .accept(
                "4",
                1,
                &AcceptMergeRequestOptions {
                    sha: Some("deadbeef".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::CONFLICT));
        assert_eq!(err.to_string(), "SHA does not match HEAD of source branch");
    }
}
