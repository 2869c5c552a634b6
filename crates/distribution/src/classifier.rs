//! Contribution classifier: who composed, who wrote, who performed.

use royalty_repertoire::{ArtistId, Contribution, ContributionKind};

/// Contributors of one creation, partitioned by contribution kind.
///
/// Each set keeps first-seen order and lists an artist once, however many
/// records of that kind they hold. An artist may sit in several sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributorSets {
    pub composers: Vec<ArtistId>,
    pub texters: Vec<ArtistId>,
    pub performers: Vec<ArtistId>,
}

impl ContributorSets {
    /// No contributions at all: the fingerprint-only fallback applies.
    pub fn is_empty(&self) -> bool {
        self.composers.is_empty() && self.texters.is_empty() && self.performers.is_empty()
    }

    /// Composers if there are any, otherwise texters.
    pub fn creators(&self) -> &[ArtistId] {
        if self.composers.is_empty() {
            &self.texters
        } else {
            &self.composers
        }
    }

    pub fn has_creators(&self) -> bool {
        !self.creators().is_empty()
    }

    pub fn has_performers(&self) -> bool {
        !self.performers.is_empty()
    }
}

pub fn classify(contributions: &[Contribution]) -> ContributorSets {
    let mut sets = ContributorSets::default();

    for c in contributions {
        let bucket = match c.kind {
            ContributionKind::Composition => &mut sets.composers,
            ContributionKind::Text => &mut sets.texters,
            ContributionKind::Performance => &mut sets.performers,
        };
        if !bucket.contains(&c.artist) {
            bucket.push(c.artist);
        }
    }

    sets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(artist: ArtistId, kind: ContributionKind) -> Contribution {
        Contribution::new(artist, kind)
    }

    #[test]
    fn partitions_by_kind() {
        let c = ArtistId::generate();
        let t = ArtistId::generate();
        let p = ArtistId::generate();

        let sets = classify(&[
            contribution(p, ContributionKind::Performance),
            contribution(c, ContributionKind::Composition),
            contribution(t, ContributionKind::Text),
        ]);

        assert_eq!(sets.composers, vec![c]);
        assert_eq!(sets.texters, vec![t]);
        assert_eq!(sets.performers, vec![p]);
        assert_eq!(sets.creators(), &[c]);
    }

    #[test]
    fn artist_may_hold_several_kinds() {
        let a = ArtistId::generate();
        let sets = classify(&[
            contribution(a, ContributionKind::Composition),
            contribution(a, ContributionKind::Performance),
        ]);
        assert_eq!(sets.composers, vec![a]);
        assert_eq!(sets.performers, vec![a]);
    }

    #[test]
    fn duplicate_records_count_once() {
        let a = ArtistId::generate();
        let b = ArtistId::generate();
        let sets = classify(&[
            contribution(a, ContributionKind::Performance),
            contribution(b, ContributionKind::Performance),
            contribution(a, ContributionKind::Performance),
        ]);
        assert_eq!(sets.performers, vec![a, b]);
    }

    #[test]
    fn texters_are_creators_when_nobody_composed() {
        let t = ArtistId::generate();
        let sets = classify(&[contribution(t, ContributionKind::Text)]);
        assert_eq!(sets.creators(), &[t]);
        assert!(sets.has_creators());
        assert!(!sets.has_performers());
    }

    #[test]
    fn no_contributions_means_empty_sets() {
        let sets = classify(&[]);
        assert!(sets.is_empty());
        assert!(!sets.has_creators());
    }
}
