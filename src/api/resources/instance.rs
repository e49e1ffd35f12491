//
//  gitlab-client
//  api/resources/instance.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Instance version and metadata
//!
//! - `GET /version`
//! - `GET /metadata`

use serde::{Deserialize, Serialize};

use crate::api::client::GitlabClient;
use crate::api::common::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    pub version: String,
    pub revision: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub version: String,
    pub revision: String,
    pub kas: KasInfo,
    pub enterprise: bool,
}

/// GitLab agent server details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KasInfo {
    pub enabled: bool,
    #[serde(rename = "externalUrl")]
    pub external_url: Option<String>,
    pub version: Option<String>,
}

/// Instance-level queries.
pub struct Instance<'a> {
    client: &'a GitlabClient,
}

impl<'a> Instance<'a> {
    pub(crate) fn new(client: &'a GitlabClient) -> Self {
        Self { client }
    }

    pub async fn version(&self) -> Result<Version> {
        self.client.get("version", &()).await
    }

    pub async fn metadata(&self) -> Result<Metadata> {
        self.client.get("metadata", &()).await
    }
}
