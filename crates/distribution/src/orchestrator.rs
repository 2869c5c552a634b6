//! Distribution orchestrator.
//!
//! Reads pending utilisations, groups them by utilising party, and for every
//! funded party books one balanced move: the pocket is debited, the company
//! fee and every contributor's hat are credited.
//!
//! The orchestrator performs writes through the repository as it goes. It
//! never commits anything itself: the caller must run it inside a unit of
//! work that is discarded when an error is returned, and must not run two
//! distributions concurrently (see `royalty-infra`).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use royalty_accounting::{Account, Counterparty, Journal, Move, MoveBuilder, Period};
use royalty_core::DomainResult;
use royalty_parties::{Party, PartyId};
use royalty_repertoire::{Artist, ArtistId};

use crate::apportion::{Apportionment, apportion};
use crate::config::{CodeSequence, DistributionConfig};
use crate::error::DistributionError;
use crate::model::{
    AllocationKind, AllocationReport, DateWindow, Distribution, DistributionResult, NewAllocation,
    SkipReason, SkippedParty, Utilisation, UtilisationId, UtilisationState,
};
use crate::repository::{DistributionRepository, RepositoryError};

/// Ledger targets resolved once per run.
struct LedgerTargets {
    fee_account: Account,
    journal: Journal,
    period: Period,
}

/// Per-party figures derived from the pocket.
struct PartyAmounts {
    amount: Decimal,
    fee_amount: Decimal,
    share_amount: Decimal,
}

pub struct Distributor {
    config: DistributionConfig,
    sequence: Arc<dyn CodeSequence>,
}

impl Distributor {
    pub fn new(config: DistributionConfig, sequence: Arc<dyn CodeSequence>) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self { config, sequence })
    }

    pub fn config(&self) -> &DistributionConfig {
        &self.config
    }

    /// Distribute everything pending between `from` and `thru` (inclusive).
    ///
    /// Returns a no-op result, creating nothing, when no utilisation is pending
    /// in the window.
    pub fn run<R>(
        &self,
        repo: &mut R,
        run_date: NaiveDate,
        from: NaiveDate,
        thru: NaiveDate,
    ) -> Result<DistributionResult, DistributionError>
    where
        R: DistributionRepository + ?Sized,
    {
        if from > thru {
            return Err(DistributionError::InvalidDateRange { from, thru });
        }
        let window = DateWindow::new(from, thru)?;

        let span = tracing::info_span!("distribution_run", %run_date, %from, %thru);
        let _guard = span.enter();

        let pending: Vec<Utilisation> = repo
            .find_pending_utilisations(&window)?
            .into_iter()
            .filter(|u| u.is_pending() && window.contains(u.timestamp()))
            .collect();

        if pending.is_empty() {
            tracing::info!("no pending utilisations; nothing to distribute");
            return Ok(DistributionResult::noop());
        }

        let targets = self.resolve_targets(&*repo, run_date)?;
        let distribution = repo.create_distribution(self.sequence.as_ref(), run_date, from, thru)?;
        tracing::info!(code = %distribution.code, pending = pending.len(), "distribution created");

        let mut groups: BTreeMap<PartyId, Vec<Utilisation>> = BTreeMap::new();
        for u in pending {
            groups.entry(u.party()).or_default().push(u);
        }

        let mut result = DistributionResult::default();
        let mut moves: Vec<Move> = Vec::new();
        let mut processed: Vec<UtilisationId> = Vec::new();
        let mut artists: HashMap<ArtistId, Artist> = HashMap::new();

        for (party_id, utilisations) in groups {
            let party = repo
                .find_party(party_id)?
                .ok_or_else(|| RepositoryError::not_found("party", party_id))?;

            let amounts = match self.party_amounts(&*repo, &party, utilisations.len())? {
                Ok(amounts) => amounts,
                Err(reason) => {
                    tracing::info!(
                        party = %party.name(),
                        ?reason,
                        utilisations = utilisations.len(),
                        "party skipped"
                    );
                    result.skipped.push(SkippedParty {
                        party: party_id,
                        reason,
                        utilisations: utilisations.len(),
                    });
                    continue;
                }
            };

            let ids: Vec<UtilisationId> = utilisations.iter().map(Utilisation::id_typed).collect();
            let allocation = repo.create_allocation(NewAllocation {
                distribution: distribution.id,
                party: party_id,
                kind: AllocationKind::Pocket2Hats,
                amount: amounts.amount,
                fee_amount: amounts.fee_amount,
                share_amount: amounts.share_amount,
                utilisations: ids.clone(),
            })?;
            repo.update_utilisation_state(&ids, UtilisationState::Processing, Some(allocation.id))?;

            let (mv, fee_booked, payouts) = self.build_move(
                &*repo,
                &mut artists,
                &targets,
                &distribution,
                &party,
                &utilisations,
                &amounts,
                run_date,
            )?;
            repo.attach_moves(allocation.id, &[mv.id])?;

            tracing::debug!(
                party = %party.name(),
                amount = %amounts.amount,
                fee = %fee_booked,
                share = %amounts.share_amount,
                artists = payouts.len(),
                "allocation booked"
            );

            let mut allocation = allocation;
            allocation.moves.push(mv.id);
            result.allocations.push(AllocationReport {
                allocation,
                fee_booked,
                payouts,
            });
            processed.extend(ids);
            moves.push(mv);
        }

        result.moves = repo.create_ledger_moves(moves)?;
        repo.update_utilisation_state(&processed, UtilisationState::Distributed, None)?;

        result.utilisations_processed = processed.len();
        tracing::info!(
            code = %distribution.code,
            allocations = result.allocations.len(),
            skipped = result.skipped.len(),
            utilisations = result.utilisations_processed,
            "distribution finished"
        );
        result.distribution = Some(distribution);
        Ok(result)
    }

    fn resolve_targets<R>(
        &self,
        repo: &R,
        run_date: NaiveDate,
    ) -> Result<LedgerTargets, DistributionError>
    where
        R: DistributionRepository + ?Sized,
    {
        let fee_account = repo.find_account(self.config.fee_account_kind)?.ok_or_else(|| {
            DistributionError::account_resolution(format!(
                "no {:?} account for company fees",
                self.config.fee_account_kind
            ))
        })?;
        let journal = repo.find_journal(&self.config.journal_code)?.ok_or_else(|| {
            DistributionError::account_resolution(format!(
                "no journal with code {}",
                self.config.journal_code
            ))
        })?;
        let period = repo.find_period(self.config.company, run_date)?.ok_or_else(|| {
            DistributionError::account_resolution(format!(
                "no open period for company {} on {run_date}",
                self.config.company
            ))
        })?;

        Ok(LedgerTargets {
            fee_account,
            journal,
            period,
        })
    }

    /// Amount, fee and per-utilisation share for a party, or why it is skipped.
    fn party_amounts<R>(
        &self,
        repo: &R,
        party: &Party,
        count: usize,
    ) -> Result<Result<PartyAmounts, SkipReason>, DistributionError>
    where
        R: DistributionRepository + ?Sized,
    {
        let currency = &self.config.currency;

        let balance = repo.pocket_balance(party.id_typed())?;
        if balance <= Decimal::ZERO {
            return Ok(Err(SkipReason::ZeroBalance));
        }

        let amount = currency.round(balance.min(party.pocket_budget()));
        if amount <= Decimal::ZERO {
            return Ok(Err(SkipReason::ZeroAmount));
        }

        let fee_amount = currency.round(currency.percent_of(amount, self.config.fee_percent));
        let share_amount = currency.round((amount - fee_amount) / Decimal::from(count));

        Ok(Ok(PartyAmounts {
            amount,
            fee_amount,
            share_amount,
        }))
    }

    /// One move per party: fee line, pocket line, then hat credits per utilisation.
    ///
    /// The fee line absorbs `amount − fee − count × share`, so the move balances
    /// to the cent. If that residual would make the fee line negative it is
    /// booked as a debit on the fee account instead.
    #[allow(clippy::too_many_arguments)]
    fn build_move<R>(
        &self,
        repo: &R,
        artists: &mut HashMap<ArtistId, Artist>,
        targets: &LedgerTargets,
        distribution: &Distribution,
        party: &Party,
        utilisations: &[Utilisation],
        amounts: &PartyAmounts,
        run_date: NaiveDate,
    ) -> Result<(Move, Decimal, Apportionment), DistributionError>
    where
        R: DistributionRepository + ?Sized,
    {
        let currency = &self.config.currency;
        let shares_total = amounts.share_amount * Decimal::from(utilisations.len());
        let fee_booked = amounts.amount - shares_total;

        let mut builder = MoveBuilder::new(
            &targets.journal,
            &targets.period,
            run_date,
            format!("{} {}", distribution.code, party.name()),
        );

        let fee_label = format!("{} fee", distribution.code);
        if fee_booked >= Decimal::ZERO {
            builder.credit(targets.fee_account.id, None, fee_booked, &fee_label);
        } else {
            builder.debit(targets.fee_account.id, None, -fee_booked, &fee_label);
        }
        builder.debit(
            party.pocket_account(),
            Some(Counterparty::Party(party.id_typed())),
            amounts.amount,
            &format!("{} pocket", distribution.code),
        );

        let mut payouts = Apportionment::new();
        for u in utilisations {
            let creation = repo
                .find_creation(u.creation())?
                .ok_or_else(|| RepositoryError::not_found("creation", u.creation()))?;

            let breakdown = apportion(&creation, amounts.share_amount, &self.config.split);
            let settled = breakdown.settle(amounts.share_amount, currency);

            for (artist_id, credit) in &settled {
                let hat_account = match artists.get(artist_id) {
                    Some(artist) => artist.hat_account(),
                    None => {
                        let artist = repo
                            .find_artist(*artist_id)?
                            .ok_or_else(|| RepositoryError::not_found("artist", artist_id))?;
                        let hat = artist.hat_account();
                        artists.insert(*artist_id, artist);
                        hat
                    }
                };
                builder.credit(
                    hat_account,
                    Some(Counterparty::Artist(*artist_id)),
                    *credit,
                    &format!("{} {}", creation.title(), u.id_typed()),
                );
            }

            payouts = payouts.merge(settled.into_iter().collect());
        }

        let mv = builder.build()?;
        Ok((mv, fee_booked, payouts))
    }
}
