use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use royalty_core::{AccountId, CompanyId, DomainError, DomainResult, Entity};

royalty_core::typed_id!(
    /// Party identifier.
    PartyId
);

/// Utilising party: owns a pocket account and a per-cycle pocket budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    id: PartyId,
    name: String,
    company: CompanyId,
    pocket_account: AccountId,
    /// Spending ceiling for a single distribution cycle.
    pocket_budget: Decimal,
}

impl Party {
    pub fn new(
        id: PartyId,
        name: impl Into<String>,
        company: CompanyId,
        pocket_account: AccountId,
        pocket_budget: Decimal,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("party name must not be empty"));
        }
        Self::check_budget(pocket_budget)?;

        Ok(Self {
            id,
            name,
            company,
            pocket_account,
            pocket_budget,
        })
    }

    fn check_budget(budget: Decimal) -> DomainResult<()> {
        if budget < Decimal::ZERO {
            return Err(DomainError::validation("pocket budget must not be negative"));
        }
        Ok(())
    }

    pub fn id_typed(&self) -> PartyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn company(&self) -> CompanyId {
        self.company
    }

    pub fn pocket_account(&self) -> AccountId {
        self.pocket_account
    }

    pub fn pocket_budget(&self) -> Decimal {
        self.pocket_budget
    }

    pub fn set_pocket_budget(&mut self, budget: Decimal) -> DomainResult<()> {
        Self::check_budget(budget)?;
        self.pocket_budget = budget;
        Ok(())
    }
}

impl Entity for Party {
    type Id = PartyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn party(budget: Decimal) -> DomainResult<Party> {
        Party::new(
            PartyId::generate(),
            "Club Voltaire",
            CompanyId::new(),
            AccountId::new(),
            budget,
        )
    }

    #[test]
    fn registers_with_budget() {
        let p = party(dec!(250.00)).unwrap();
        assert_eq!(p.name(), "Club Voltaire");
        assert_eq!(p.pocket_budget(), dec!(250.00));
        assert_eq!(p.id(), &p.id_typed());
    }

    #[test]
    fn negative_budget_is_rejected() {
        assert!(matches!(party(dec!(-1)), Err(DomainError::Validation(_))));

        let mut p = party(dec!(0)).unwrap();
        assert!(p.set_pocket_budget(dec!(-0.01)).is_err());
        assert_eq!(p.pocket_budget(), dec!(0));
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Party::new(
            PartyId::generate(),
            "   ",
            CompanyId::new(),
            AccountId::new(),
            dec!(1),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
