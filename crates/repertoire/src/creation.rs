use serde::{Deserialize, Serialize};

use royalty_core::{DomainError, DomainResult, Entity};

use crate::artist::ArtistId;

royalty_core::typed_id!(
    /// Creation identifier.
    CreationId
);

/// What an artist contributed to a creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionKind {
    Performance,
    Composition,
    Text,
}

/// One artist's contribution to a creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub artist: ArtistId,
    pub kind: ContributionKind,
    /// Free-form roles (e.g. "lead vocals", "arranger"). Informational only.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Contribution {
    pub fn new(artist: ArtistId, kind: ContributionKind) -> Self {
        Self {
            artist,
            kind,
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }
}

/// A work attributed to an artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creation {
    id: CreationId,
    title: String,
    /// Attributed artist; receives everything when there are no contributions.
    artist: ArtistId,
    contributions: Vec<Contribution>,
    /// Works this creation derives from. Recorded, not used for allocation.
    originals: Vec<CreationId>,
}

impl Creation {
    pub fn new(id: CreationId, title: impl Into<String>, artist: ArtistId) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("creation title must not be empty"));
        }
        Ok(Self {
            id,
            title,
            artist,
            contributions: Vec::new(),
            originals: Vec::new(),
        })
    }

    pub fn with_contribution(mut self, contribution: Contribution) -> Self {
        self.contributions.push(contribution);
        self
    }

    pub fn with_contributions(
        mut self,
        contributions: impl IntoIterator<Item = Contribution>,
    ) -> Self {
        self.contributions.extend(contributions);
        self
    }

    pub fn derived_from(mut self, original: CreationId) -> DomainResult<Self> {
        if original == self.id {
            return Err(DomainError::invariant("a creation cannot derive from itself"));
        }
        if !self.originals.contains(&original) {
            self.originals.push(original);
        }
        Ok(self)
    }

    pub fn id_typed(&self) -> CreationId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> ArtistId {
        self.artist
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn originals(&self) -> &[CreationId] {
        &self.originals
    }
}

impl Entity for Creation {
    type Id = CreationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
