//! JSON fixtures describing a small society: chart of accounts, parties,
//! repertoire and utilisations. Records refer to each other by string keys.

use std::collections::BTreeMap;

use anyhow::{Context, anyhow, bail};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use royalty_accounting::{Account, AccountKind, Journal, Period};
use royalty_core::{AccountId, CompanyId};
use royalty_distribution::{Utilisation, UtilisationId};
use royalty_infra::{InMemoryRepository, RepositoryState};
use royalty_parties::{Party, PartyId};
use royalty_repertoire::{Artist, ArtistId, Contribution, ContributionKind, Creation, CreationId};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub accounts: Vec<AccountSpec>,
    pub journals: Vec<JournalSpec>,
    pub periods: Vec<PeriodSpec>,
    #[serde(default)]
    pub parties: Vec<PartySpec>,
    /// Solo artists must be listed before the groups they belong to.
    #[serde(default)]
    pub artists: Vec<ArtistSpec>,
    /// Originals must be listed before their derivatives.
    #[serde(default)]
    pub creations: Vec<CreationSpec>,
    #[serde(default)]
    pub utilisations: Vec<UtilisationSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSpec {
    pub key: String,
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JournalSpec {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeriodSpec {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepositSpec {
    pub date: NaiveDate,
    pub amount: Decimal,
    /// Defaults to the first journal of the fixture.
    #[serde(default)]
    pub journal: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartySpec {
    pub key: String,
    pub name: String,
    pub pocket_account: String,
    pub budget: Decimal,
    #[serde(default)]
    pub deposits: Vec<DepositSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtistSpec {
    pub key: String,
    pub name: String,
    pub hat_account: String,
    #[serde(default)]
    pub party: Option<String>,
    /// Non-empty for groups.
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContributionSpec {
    pub artist: String,
    pub kind: ContributionKind,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreationSpec {
    pub key: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub contributions: Vec<ContributionSpec>,
    #[serde(default)]
    pub originals: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UtilisationSpec {
    pub party: String,
    pub creation: String,
    pub timestamp: DateTime<Utc>,
}

/// Ids assigned to fixture keys, for reporting.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub parties: BTreeMap<String, PartyId>,
    pub artists: BTreeMap<String, ArtistId>,
    pub creations: BTreeMap<String, CreationId>,
}

fn lookup<T: Copy>(map: &BTreeMap<String, T>, what: &str, key: &str) -> anyhow::Result<T> {
    map.get(key)
        .copied()
        .ok_or_else(|| anyhow!("unknown {what} key '{key}'"))
}

impl Fixture {
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("malformed fixture")
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read fixture {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// Load everything in one unit of work: a bad fixture leaves `repo` untouched.
    pub fn load(&self, repo: &InMemoryRepository, company: CompanyId) -> anyhow::Result<Loaded> {
        repo.transaction(|state| self.load_into(state, company))
    }

    fn load_into(&self, s: &mut RepositoryState, company: CompanyId) -> anyhow::Result<Loaded> {
        let mut accounts: BTreeMap<String, AccountId> = BTreeMap::new();
        for a in &self.accounts {
            let id = s.add_account(Account::new(&a.code, &a.name, a.kind))?;
            if accounts.insert(a.key.clone(), id).is_some() {
                bail!("duplicate account key '{}'", a.key);
            }
        }

        for j in &self.journals {
            s.add_journal(Journal::new(&j.code, &j.name))?;
        }
        let default_journal = self.journals.first().map(|j| j.code.clone());

        for p in &self.periods {
            let mut period = Period::new(company, &p.name, p.start, p.end)?;
            if p.closed {
                period.close();
            }
            s.add_period(period)?;
        }

        let mut loaded = Loaded::default();

        for p in &self.parties {
            let pocket = lookup(&accounts, "account", &p.pocket_account)?;
            let party = Party::new(PartyId::generate(), &p.name, company, pocket, p.budget)?;
            let id = s.insert_party(party)?;
            if loaded.parties.insert(p.key.clone(), id).is_some() {
                bail!("duplicate party key '{}'", p.key);
            }
            for d in &p.deposits {
                let journal = d
                    .journal
                    .clone()
                    .or_else(|| default_journal.clone())
                    .ok_or_else(|| anyhow!("deposit for '{}' needs a journal", p.key))?;
                s.deposit_to_pocket(id, d.amount, d.date, &journal)
                    .with_context(|| format!("deposit for party '{}'", p.key))?;
            }
        }

        for a in &self.artists {
            let hat = lookup(&accounts, "account", &a.hat_account)?;
            let mut artist = if a.members.is_empty() {
                Artist::solo(ArtistId::generate(), &a.name, hat)?
            } else {
                let members = a
                    .members
                    .iter()
                    .map(|m| lookup(&loaded.artists, "artist", m))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Artist::group(ArtistId::generate(), &a.name, members, hat)?
            };
            if let Some(party) = &a.party {
                artist = artist.with_party(lookup(&loaded.parties, "party", party)?);
            }
            let id = s.insert_artist(artist)?;
            if loaded.artists.insert(a.key.clone(), id).is_some() {
                bail!("duplicate artist key '{}'", a.key);
            }
        }

        for c in &self.creations {
            let mut creation = Creation::new(
                CreationId::generate(),
                &c.title,
                lookup(&loaded.artists, "artist", &c.artist)?,
            )?;
            for contribution in &c.contributions {
                let artist = lookup(&loaded.artists, "artist", &contribution.artist)?;
                let mut record = Contribution::new(artist, contribution.kind);
                for role in &contribution.roles {
                    record = record.with_role(role);
                }
                creation = creation.with_contribution(record);
            }
            for original in &c.originals {
                creation = creation.derived_from(lookup(&loaded.creations, "creation", original)?)?;
            }
            let id = s.insert_creation(creation)?;
            if loaded.creations.insert(c.key.clone(), id).is_some() {
                bail!("duplicate creation key '{}'", c.key);
            }
        }

        for u in &self.utilisations {
            let party = lookup(&loaded.parties, "party", &u.party)?;
            let creation = lookup(&loaded.creations, "creation", &u.creation)?;
            s.record_utilisation(Utilisation::new(
                UtilisationId::generate(),
                party,
                creation,
                u.timestamp,
            ))?;
        }

        tracing::info!(
            parties = loaded.parties.len(),
            artists = loaded.artists.len(),
            creations = loaded.creations.len(),
            utilisations = self.utilisations.len(),
            "fixture loaded"
        );
        Ok(loaded)
    }
}
