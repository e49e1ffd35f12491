//
//  gitlab-client
//  api/resources/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # GitLab Resource Accessors
//!
//! Typed operations for individual REST resources. Each accessor borrows a
//! [`GitlabClient`](crate::GitlabClient) and maps its methods onto path
//! templates; all transport, auth and error handling happens in the
//! client.
//!
//! ## Resources
//!
//! | Accessor | Operations |
//! |----------|------------|
//! | [`Projects`] | list, get |
//! | [`Branches`] | list, create, delete, delete merged |
//! | [`Commits`] | list |
//! | [`Tags`] | list |
//! | [`Groups`] | list |
//! | [`MergeRequests`] | create, accept |
//! | [`Users`] | current user, add/delete SSH key |
//! | [`Instance`] | version, metadata |
//!
//! Project arguments accept a numeric id or a `namespace/path` string; the
//! latter is percent-encoded into a single path segment.

mod branches;
mod commits;
mod groups;
mod instance;
mod merge_requests;
mod projects;
mod tags;
mod users;

pub use branches::*;
pub use commits::*;
pub use groups::*;
pub use instance::*;
pub use merge_requests::*;
pub use projects::*;
pub use tags::*;
pub use users::*;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Encodes a project id or `namespace/path` as one URL path segment.
pub fn path_segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Project, group or snippet visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Internal,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric member access level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLevel(pub u8);

impl AccessLevel {
    pub const NO_ACCESS: Self = Self(0);
    pub const MINIMAL: Self = Self(5);
    pub const GUEST: Self = Self(10);
    pub const REPORTER: Self = Self(20);
    pub const DEVELOPER: Self = Self(30);
    pub const MAINTAINER: Self = Self(40);
    pub const OWNER: Self = Self(50);

    pub fn name(&self) -> &'static str {
        match self.0 {
            0 => "none",
            5 => "minimal",
            10 => "guest",
            20 => "reporter",
            30 => "developer",
            40 => "maintainer",
            50 => "owner",
            _ => "custom",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

/// User summary embedded in other resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicUser {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub web_url: String,
}

/// Pipeline summary embedded in commits and merge requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub id: u64,
    #[serde(default)]
    pub iid: u64,
    #[serde(default)]
    pub project_id: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
