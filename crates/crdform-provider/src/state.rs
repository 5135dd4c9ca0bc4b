//! Recorded resource state

use chrono::{DateTime, Utc};
use crdform_core::Manifest;
use serde::{Deserialize, Serialize};

use crate::clock::FreshnessMarker;

/// State recorded for one resource address after create or update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    /// Address the host manages this resource under
    pub address: String,

    /// Freshness marker of the last write
    pub id: FreshnessMarker,

    /// Resource type name, e.g. `k8s_cert_manager_io_certificate_v1_manifest`
    pub type_name: String,

    pub kind: String,

    pub api_version: String,

    /// Assembled manifest
    pub yaml: String,

    /// SHA256 of `yaml`
    pub digest: String,

    /// Number of writes, starting at 1
    pub revision: u32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ResourceState {
    /// State for a newly created resource
    pub fn for_create(
        address: impl Into<String>,
        id: FreshnessMarker,
        type_name: impl Into<String>,
        kind: impl Into<String>,
        api_version: impl Into<String>,
        manifest: Manifest,
    ) -> Self {
        let now = Utc::now();
        let digest = manifest.digest();
        Self {
            address: address.into(),
            id,
            type_name: type_name.into(),
            kind: kind.into(),
            api_version: api_version.into(),
            yaml: manifest.into_string(),
            digest,
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Next revision after an update; creation time is carried over
    pub fn for_update(previous: &ResourceState, id: FreshnessMarker, manifest: Manifest) -> Self {
        let digest = manifest.digest();
        Self {
            address: previous.address.clone(),
            id,
            type_name: previous.type_name.clone(),
            kind: previous.kind.clone(),
            api_version: previous.api_version.clone(),
            yaml: manifest.into_string(),
            digest,
            revision: previous.revision + 1,
            created_at: previous.created_at,
            updated_at: Utc::now(),
        }
    }
}
