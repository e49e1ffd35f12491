//
//  gitlab-client
//  api/resources/users.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Users API
//!
//! - `GET /user`
//! - `POST /user/keys`
//! - `DELETE /user/keys/:key_id`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::client::GitlabClient;
use crate::api::common::{json_body_options, Result};

/// The authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub public_email: Option<String>,
    pub state: String,
    pub bot: bool,
    pub is_admin: bool,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub organization: Option<String>,
    pub job_title: Option<String>,
    pub avatar_url: Option<String>,
    pub web_url: String,
    pub two_factor_enabled: bool,
    pub external: bool,
    pub can_create_group: bool,
    pub can_create_project: bool,
    pub projects_limit: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// An SSH key registered to the authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshKey {
    pub id: u64,
    pub title: String,
    pub key: String,
    pub usage_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Body for [`Users::add_ssh_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddSshKeyOptions {
    pub title: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// `auth`, `signing` or `auth_and_signing` (GitLab 15.7+).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_type: Option<String>,
}

json_body_options!(AddSshKeyOptions);

/// Operations on the authenticated user.
pub struct Users<'a> {
    client: &'a GitlabClient,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a GitlabClient) -> Self {
        Self { client }
    }

    /// The user the credential belongs to.
    pub async fn current(&self) -> Result<User> {
        self.client.get("user", &()).await
    }

    pub async fn add_ssh_key(&self, options: &AddSshKeyOptions) -> Result<SshKey> {
        self.client.post("user/keys", options).await
    }

    pub async fn delete_ssh_key(&self, key_id: u64) -> Result<()> {
        self.client
            .delete(&format!("user/keys/{key_id}"), &())
            .await
    }
}
