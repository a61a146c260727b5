// Schedulable Resource Domain Model

use serde::{Deserialize, Serialize};

/// Resource identifier
pub type ResourceId = String;

/// Practitioner name parts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub prefix: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub suffix: Option<String>,
}

impl PersonName {
    pub fn new(first_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            ..Default::default()
        }
    }

    /// Join the non-empty name parts with single spaces
    pub fn display_name(&self) -> String {
        [
            self.prefix.as_deref(),
            Some(self.first_name.as_str()),
            self.last_name.as_deref(),
            self.suffix.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// What a queue serves. Closed set: a new kind is a compile-time change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceKind {
    Practitioner(PersonName),
    HealthcareService { name: String },
    Location { name: String },
}

impl ResourceKind {
    pub const PRACTITIONER: &'static str = "practitioner";
    pub const HEALTHCARE_SERVICE: &'static str = "healthcare_service";
    pub const LOCATION: &'static str = "location";

    /// Storage tag of this kind
    pub fn tag(&self) -> &'static str {
        match self {
            ResourceKind::Practitioner(_) => Self::PRACTITIONER,
            ResourceKind::HealthcareService { .. } => Self::HEALTHCARE_SERVICE,
            ResourceKind::Location { .. } => Self::LOCATION,
        }
    }
}

/// Practitioner, healthcare service, or location a queue serves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub kind: ResourceKind,
}

impl Resource {
    pub fn new(id: impl Into<ResourceId>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.kind {
            ResourceKind::Practitioner(name) => name.display_name(),
            ResourceKind::HealthcareService { name } => name.clone(),
            ResourceKind::Location { name } => name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_practitioner_name_joins_present_parts() {
        let name = PersonName {
            prefix: Some("Dr.".into()),
            first_name: "Jane".into(),
            last_name: Some("Doe".into()),
            suffix: Some("Jr.".into()),
        };
        assert_eq!(name.display_name(), "Dr. Jane Doe Jr.");
    }

    #[test]
    fn test_practitioner_name_skips_blank_parts() {
        let name = PersonName {
            prefix: Some("".into()),
            first_name: "Asha".into(),
            last_name: None,
            suffix: Some("  ".into()),
        };
        assert_eq!(name.display_name(), "Asha");
    }

    #[test]
    fn test_display_name_per_kind() {
        let service = Resource::new(
            "r1",
            ResourceKind::HealthcareService {
                name: "Radiology".into(),
            },
        );
        let location = Resource::new(
            "r2",
            ResourceKind::Location {
                name: "Ward 3".into(),
            },
        );
        let practitioner = Resource::new("r3", ResourceKind::Practitioner(PersonName::new("Ravi")));

        assert_eq!(service.display_name(), "Radiology");
        assert_eq!(location.display_name(), "Ward 3");
        assert_eq!(practitioner.display_name(), "Ravi");
    }
}
