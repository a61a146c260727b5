// Sub-queue Domain Model

use crate::domain::error::DomainError;
use crate::domain::resource::ResourceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// External sub-queue identifier (globally unique)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubQueueId(Uuid);

impl SubQueueId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse a comma-separated id list from a display URL.
    ///
    /// Blank or malformed entries are dropped, duplicates collapse onto their
    /// first occurrence, request order is otherwise preserved.
    pub fn parse_list(raw: &str) -> Vec<SubQueueId> {
        let mut ids: Vec<SubQueueId> = Vec::new();
        for part in raw.split(',') {
            let Ok(id) = part.trim().parse::<SubQueueId>() else {
                continue;
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

impl From<Uuid> for SubQueueId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for SubQueueId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| DomainError::InvalidSubQueueId(s.to_string()))
    }
}

impl fmt::Display for SubQueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Sub-queue lifecycle status (owned by the scheduling system)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubQueueStatus {
    Active,
    Inactive,
}

impl SubQueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubQueueStatus::Active => "active",
            SubQueueStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for SubQueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubQueueStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubQueueStatus::Active),
            "inactive" => Ok(SubQueueStatus::Inactive),
            other => Err(DomainError::UnknownSubQueueStatus(other.to_string())),
        }
    }
}

/// A named subdivision of a service queue, tied to one schedulable resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubQueue {
    pub id: SubQueueId,
    pub name: String,
    pub resource_id: ResourceId,
    pub status: SubQueueStatus,
}

impl SubQueue {
    pub fn new(
        id: SubQueueId,
        name: impl Into<String>,
        resource_id: impl Into<ResourceId>,
        status: SubQueueStatus,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            resource_id: resource_id.into(),
            status,
        }
    }

    /// Only active sub-queues are displayable
    pub fn is_displayable(&self) -> bool {
        self.status == SubQueueStatus::Active
    }
}
