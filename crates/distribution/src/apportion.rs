//! Allocation apportioner: splits one creation's share across its contributors.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use royalty_core::Currency;
use royalty_repertoire::{ArtistId, Creation};

use crate::classifier::classify;
use crate::config::SplitPolicy;

/// Artist → amount breakdown, kept at full decimal precision.
///
/// Values are immutable once built; callers fold several breakdowns together
/// with [`Apportionment::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Apportionment(BTreeMap<ArtistId, Decimal>);

impl Apportionment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, artist: &ArtistId) -> Option<Decimal> {
        self.0.get(artist).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArtistId, &Decimal)> {
        self.0.iter()
    }

    pub fn total(&self) -> Decimal {
        self.0.values().copied().sum()
    }

    /// Sum two breakdowns; artists present in both get the sum of their shares.
    pub fn merge(mut self, other: Apportionment) -> Apportionment {
        for (artist, amount) in other.0 {
            *self.0.entry(artist).or_insert(Decimal::ZERO) += amount;
        }
        self
    }

    /// Cut every share to currency precision so that the results add up to
    /// `target` exactly, without any share going below zero.
    ///
    /// Shares are truncated to whole units; the units this leaves over are
    /// handed out one at a time by descending sub-unit remainder (artist order
    /// on ties). A target finer than the currency unit puts its sub-unit rest
    /// on the first share in that order.
    pub fn settle(&self, target: Decimal, currency: &Currency) -> Vec<(ArtistId, Decimal)> {
        let mut settled: Vec<(ArtistId, Decimal)> = self
            .0
            .iter()
            .map(|(artist, amount)| (*artist, currency.truncate(*amount)))
            .collect();
        if settled.is_empty() {
            return settled;
        }

        let residual = target - settled.iter().map(|(_, a)| *a).sum::<Decimal>();
        if residual <= Decimal::ZERO {
            return settled;
        }

        // Stable sort keeps artist order among equal remainders.
        let mut order: Vec<usize> = (0..settled.len()).collect();
        order.sort_by(|&a, &b| {
            let rem_a = self.0[&settled[a].0] - settled[a].1;
            let rem_b = self.0[&settled[b].0] - settled[b].1;
            rem_b.cmp(&rem_a)
        });

        let unit = currency.smallest_unit();
        let units = (residual / unit).trunc();
        let rest = residual - units * unit;

        let mut left = units;
        let mut next = 0;
        while left > Decimal::ZERO {
            settled[order[next % order.len()]].1 += unit;
            left -= Decimal::ONE;
            next += 1;
        }
        settled[order[0]].1 += rest;

        settled
    }
}

impl FromIterator<(ArtistId, Decimal)> for Apportionment {
    fn from_iter<I: IntoIterator<Item = (ArtistId, Decimal)>>(iter: I) -> Self {
        let mut map = BTreeMap::new();
        for (artist, amount) in iter {
            *map.entry(artist).or_insert(Decimal::ZERO) += amount;
        }
        Self(map)
    }
}

/// Split `amount` across the artists who contributed to `creation`.
///
/// - no contributions: everything goes to the creation's attributed artist;
/// - performers and creators both present: performers get
///   `performer_percent`, creators the rest;
/// - the creative part goes to composers and texters
///   (`composer_percent`/`texter_percent` when both are present), each group
///   split equally among its members.
///
/// The returned shares add up to `amount` up to decimal precision.
pub fn apportion(creation: &Creation, amount: Decimal, policy: &SplitPolicy) -> Apportionment {
    let sets = classify(creation.contributions());

    if sets.is_empty() {
        return Apportionment::from_iter([(creation.artist(), amount)]);
    }

    let (creative, performance) = if sets.has_performers() && sets.has_creators() {
        let performance = amount * policy.performer_percent / Decimal::ONE_HUNDRED;
        (amount - performance, performance)
    } else if sets.has_performers() {
        (Decimal::ZERO, amount)
    } else {
        (amount, Decimal::ZERO)
    };

    let (composer_each, texter_each) = match (sets.composers.len(), sets.texters.len()) {
        (0, 0) => (Decimal::ZERO, Decimal::ZERO),
        (0, texters) => (Decimal::ZERO, creative / Decimal::from(texters)),
        (composers, 0) => (creative / Decimal::from(composers), Decimal::ZERO),
        (composers, texters) => (
            creative * policy.composer_percent / Decimal::ONE_HUNDRED / Decimal::from(composers),
            creative * policy.texter_percent / Decimal::ONE_HUNDRED / Decimal::from(texters),
        ),
    };

    let performer_each = if sets.has_performers() {
        performance / Decimal::from(sets.performers.len())
    } else {
        Decimal::ZERO
    };

    sets.composers
        .iter()
        .map(|a| (*a, composer_each))
        .chain(sets.texters.iter().map(|a| (*a, texter_each)))
        .chain(sets.performers.iter().map(|a| (*a, performer_each)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use royalty_repertoire::{Contribution, ContributionKind, CreationId};
    use rust_decimal_macros::dec;

    fn creation_with(contributions: &[(ArtistId, ContributionKind)]) -> Creation {
        Creation::new(CreationId::generate(), "Test Song", ArtistId::generate())
            .unwrap()
            .with_contributions(contributions.iter().map(|(a, k)| Contribution::new(*a, *k)))
    }

    fn performed_by(performers: &[ArtistId]) -> Creation {
        let contributions: Vec<_> = performers
            .iter()
            .map(|p| (*p, ContributionKind::Performance))
            .collect();
        creation_with(&contributions)
    }

    fn settled(app: &Apportionment, target: Decimal) -> BTreeMap<ArtistId, Decimal> {
        app.settle(target, &Currency::eur()).into_iter().collect()
    }

    #[test]
    fn no_contributions_falls_back_to_attributed_artist() {
        let artist = ArtistId::generate();
        let creation = Creation::new(CreationId::generate(), "Fingerprint #42", artist).unwrap();

        let app = apportion(&creation, dec!(100.00), &SplitPolicy::default());

        assert_eq!(app.len(), 1);
        assert_eq!(app.get(&artist), Some(dec!(100.00)));
    }

    #[test]
    fn composer_and_texter_split_65_35() {
        let c = ArtistId::generate();
        let t = ArtistId::generate();
        let creation = creation_with(&[
            (c, ContributionKind::Composition),
            (t, ContributionKind::Text),
        ]);

        let app = apportion(&creation, dec!(100.00), &SplitPolicy::default());

        assert_eq!(app.get(&c), Some(dec!(65.00)));
        assert_eq!(app.get(&t), Some(dec!(35.00)));
    }

    #[test]
    fn performer_and_composer_halve() {
        let p = ArtistId::generate();
        let c = ArtistId::generate();
        let creation = creation_with(&[
            (p, ContributionKind::Performance),
            (c, ContributionKind::Composition),
        ]);

        let app = apportion(&creation, dec!(100.00), &SplitPolicy::default());

        assert_eq!(app.get(&c), Some(dec!(50.00)));
        assert_eq!(app.get(&p), Some(dec!(50.00)));
    }

    #[test]
    fn performers_alone_share_everything() {
        let ps: Vec<ArtistId> = (0..3).map(|_| ArtistId::generate()).collect();
        let creation = performed_by(&ps);

        let app = apportion(&creation, dec!(90.00), &SplitPolicy::default());

        for p in &ps {
            assert_eq!(app.get(p), Some(dec!(30.00)));
        }
    }

    #[test]
    fn texters_alone_take_the_creative_share() {
        let t1 = ArtistId::generate();
        let t2 = ArtistId::generate();
        let p = ArtistId::generate();
        let creation = creation_with(&[
            (t1, ContributionKind::Text),
            (t2, ContributionKind::Text),
            (p, ContributionKind::Performance),
        ]);

        let app = apportion(&creation, dec!(100.00), &SplitPolicy::default());

        assert_eq!(app.get(&p), Some(dec!(50.00)));
        assert_eq!(app.get(&t1), Some(dec!(25.00)));
        assert_eq!(app.get(&t2), Some(dec!(25.00)));
    }

    #[test]
    fn full_line_up_splits_in_three_tiers() {
        let c = ArtistId::generate();
        let t = ArtistId::generate();
        let p1 = ArtistId::generate();
        let p2 = ArtistId::generate();
        let creation = creation_with(&[
            (c, ContributionKind::Composition),
            (t, ContributionKind::Text),
            (p1, ContributionKind::Performance),
            (p2, ContributionKind::Performance),
        ]);

        let app = apportion(&creation, dec!(200.00), &SplitPolicy::default());

        assert_eq!(app.get(&c), Some(dec!(65.00)));
        assert_eq!(app.get(&t), Some(dec!(35.00)));
        assert_eq!(app.get(&p1), Some(dec!(50.00)));
        assert_eq!(app.get(&p2), Some(dec!(50.00)));
        assert_eq!(app.total(), dec!(200.00));
    }

    #[test]
    fn an_artist_in_several_roles_gets_the_sum() {
        let a = ArtistId::generate();
        let p = ArtistId::generate();
        let creation = creation_with(&[
            (a, ContributionKind::Composition),
            (a, ContributionKind::Performance),
            (p, ContributionKind::Performance),
        ]);

        let app = apportion(&creation, dec!(100.00), &SplitPolicy::default());

        assert_eq!(app.get(&a), Some(dec!(75.00)));
        assert_eq!(app.get(&p), Some(dec!(25.00)));
    }

    #[test]
    fn merging_sums_repeated_artists() {
        let a = ArtistId::generate();
        let b = ArtistId::generate();
        let first = Apportionment::from_iter([(a, dec!(10)), (b, dec!(5))]);
        let second = Apportionment::from_iter([(a, dec!(2.5))]);

        let merged = first.merge(second);

        assert_eq!(merged.get(&a), Some(dec!(12.5)));
        assert_eq!(merged.get(&b), Some(dec!(5)));
        assert_eq!(merged.total(), dec!(17.5));
    }

    #[test]
    fn settlement_hands_the_residual_cent_to_the_first_of_equal_remainders() {
        let ps: Vec<ArtistId> = (0..3).map(|_| ArtistId::generate()).collect();
        let creation = performed_by(&ps);

        let app = apportion(&creation, dec!(100.00), &SplitPolicy::default());
        let s = settled(&app, dec!(100.00));

        // 33.33 each leaves one cent; ties go to the first artist in id order.
        let first = *s.keys().next().unwrap();
        assert_eq!(s[&first], dec!(33.34));
        assert_eq!(s.values().copied().sum::<Decimal>(), dec!(100.00));
    }

    #[test]
    fn settlement_of_exact_shares_changes_nothing() {
        let c = ArtistId::generate();
        let t = ArtistId::generate();
        let creation = creation_with(&[
            (c, ContributionKind::Composition),
            (t, ContributionKind::Text),
        ]);
        let app = apportion(&creation, dec!(100.00), &SplitPolicy::default());

        let s = settled(&app, dec!(100.00));
        assert_eq!(s[&c], dec!(65.00));
        assert_eq!(s[&t], dec!(35.00));
    }

    #[test]
    fn tiny_share_over_many_performers_never_goes_negative() {
        let ps: Vec<ArtistId> = (0..4).map(|_| ArtistId::generate()).collect();
        let creation = performed_by(&ps);

        let app = apportion(&creation, dec!(0.02), &SplitPolicy::default());
        let s = app.settle(dec!(0.02), &Currency::eur());

        // 0.005 each: two artists get a cent, two get nothing.
        assert!(s.iter().all(|(_, a)| *a >= Decimal::ZERO));
        assert_eq!(s.iter().filter(|(_, a)| *a == dec!(0.01)).count(), 2);
        assert_eq!(s.iter().map(|(_, a)| *a).sum::<Decimal>(), dec!(0.02));
        assert_eq!(s[0].1, dec!(0.01));
        assert_eq!(s[1].1, dec!(0.01));
    }

    #[test]
    fn largest_remainder_wins_the_leftover_cent() {
        let a = ArtistId::generate();
        let b = ArtistId::generate();
        let c = ArtistId::generate();
        let app = Apportionment::from_iter([(a, dec!(0.331)), (b, dec!(0.337)), (c, dec!(0.332))]);

        let s = settled(&app, dec!(1.00));

        assert_eq!(s[&a], dec!(0.33));
        assert_eq!(s[&b], dec!(0.34));
        assert_eq!(s[&c], dec!(0.33));
    }

    fn kind_strategy() -> impl Strategy<Value = ContributionKind> {
        prop_oneof![
            Just(ContributionKind::Performance),
            Just(ContributionKind::Composition),
            Just(ContributionKind::Text),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: settled shares are never negative and add up to the share
        /// amount to the cent.
        #[test]
        fn settled_shares_conserve_the_amount(
            cents in prop_oneof![0i64..100i64, 0i64..10_000_000i64],
            roles in prop::collection::vec((0usize..5usize, kind_strategy()), 0..12)
        ) {
            let artists: Vec<ArtistId> = (0..5).map(|_| ArtistId::generate()).collect();
            let contributions: Vec<(ArtistId, ContributionKind)> =
                roles.iter().map(|(i, k)| (artists[*i], *k)).collect();
            let creation = creation_with(&contributions);
            let amount = Decimal::new(cents, 2);

            let app = apportion(&creation, amount, &SplitPolicy::default());
            prop_assert!((app.total() - amount).abs() < dec!(0.000001));

            let settled = app.settle(amount, &Currency::eur());
            prop_assert!(settled.iter().all(|(_, a)| *a >= Decimal::ZERO));
            let total: Decimal = settled.iter().map(|(_, a)| *a).sum();
            prop_assert_eq!(total, amount);
        }
    }
}
