//! Organization update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrganizationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Option<serde_json::Value>>,
}

impl OrganizationUpdate {
    /// True when no field is set; such a patch writes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.slug.is_none() && self.logo.is_none() && self.metadata.is_none()
    }
}

pub struct OrganizationUpdateBuilder(OrganizationUpdate);

impl OrganizationUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(OrganizationUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.0.slug = Some(slug.into());
        self
    }

    #[must_use]
    pub fn logo(mut self, logo: Option<String>) -> Self {
        self.0.logo = Some(logo);
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: Option<serde_json::Value>) -> Self {
        self.0.metadata = Some(metadata);
        self
    }

    #[must_use]
    pub fn build(self) -> OrganizationUpdate {
        self.0
    }
}

impl Default for OrganizationUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
