use serde::{Deserialize, Serialize};

use royalty_core::{AccountId, DomainError, DomainResult, Entity};
use royalty_parties::PartyId;

royalty_core::typed_id!(
    /// Artist identifier.
    ArtistId
);

/// Solo artists stand alone; groups are composed of solo members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArtistKind {
    Solo,
    Group { members: Vec<ArtistId> },
}

/// An artist (solo or group) earning royalties into its hat account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    id: ArtistId,
    name: String,
    /// Payee legal entity, if one has been registered.
    party: Option<PartyId>,
    kind: ArtistKind,
    hat_account: AccountId,
}

impl Artist {
    pub fn solo(
        id: ArtistId,
        name: impl Into<String>,
        hat_account: AccountId,
    ) -> DomainResult<Self> {
        Self::build(id, name.into(), ArtistKind::Solo, hat_account)
    }

    /// A group of solo artists.
    ///
    /// Whether the members really are solo artists can only be checked against
    /// the repository; here we reject the structurally impossible cases.
    pub fn group(
        id: ArtistId,
        name: impl Into<String>,
        members: Vec<ArtistId>,
        hat_account: AccountId,
    ) -> DomainResult<Self> {
        if members.is_empty() {
            return Err(DomainError::validation("a group needs at least one member"));
        }
        if members.contains(&id) {
            return Err(DomainError::invariant("a group cannot be its own member"));
        }
        let mut seen = members.clone();
        seen.sort();
        seen.dedup();
        if seen.len() != members.len() {
            return Err(DomainError::validation("group members must be distinct"));
        }

        Self::build(id, name.into(), ArtistKind::Group { members }, hat_account)
    }

    fn build(
        id: ArtistId,
        name: String,
        kind: ArtistKind,
        hat_account: AccountId,
    ) -> DomainResult<Self> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("artist name must not be empty"));
        }
        Ok(Self {
            id,
            name,
            party: None,
            kind,
            hat_account,
        })
    }

    pub fn with_party(mut self, party: PartyId) -> Self {
        self.party = Some(party);
        self
    }

    pub fn id_typed(&self) -> ArtistId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn party(&self) -> Option<PartyId> {
        self.party
    }

    pub fn kind(&self) -> &ArtistKind {
        &self.kind
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ArtistKind::Group { .. })
    }

    /// Solo members of a group; empty for a solo artist.
    pub fn members(&self) -> &[ArtistId] {
        match &self.kind {
            ArtistKind::Solo => &[],
            ArtistKind::Group { members } => members,
        }
    }

    /// Ledger account holding this artist's earned, undistributed royalties.
    pub fn hat_account(&self) -> AccountId {
        self.hat_account
    }
}

impl Entity for Artist {
    type Id = ArtistId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solo_artist_has_no_members() {
        let a = Artist::solo(ArtistId::generate(), "Ada", AccountId::new()).unwrap();
        assert!(!a.is_group());
        assert!(a.members().is_empty());
        assert_eq!(a.party(), None);
    }

    #[test]
    fn group_keeps_member_order() {
        let m1 = ArtistId::generate();
        let m2 = ArtistId::generate();
        let g = Artist::group(ArtistId::generate(), "Duo", vec![m2, m1], AccountId::new()).unwrap();
        assert!(g.is_group());
        assert_eq!(g.members(), &[m2, m1]);
    }

    #[test]
    fn structurally_invalid_groups_are_rejected() {
        let id = ArtistId::generate();
        let m = ArtistId::generate();

        assert!(Artist::group(id, "Empty", vec![], AccountId::new()).is_err());
        assert!(matches!(
            Artist::group(id, "Self", vec![id], AccountId::new()),
            Err(DomainError::InvariantViolation(_))
        ));
        assert!(Artist::group(id, "Twice", vec![m, m], AccountId::new()).is_err());
    }

    #[test]
    fn payee_party_is_optional() {
        let party = PartyId::generate();
        let a = Artist::solo(ArtistId::generate(), "Bea", AccountId::new())
            .unwrap()
            .with_party(party);
        assert_eq!(a.party(), Some(party));
    }
}
