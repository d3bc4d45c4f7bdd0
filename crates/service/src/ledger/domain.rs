use models::transaction::TransactionKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create a single ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionInput {
    pub title: String,
    pub value: Decimal,
    pub kind: TransactionKind,
    pub category: String,
}

/// A validated entry ready for insertion, category already resolved.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub title: String,
    pub value: Decimal,
    pub kind: TransactionKind,
    pub category_id: Uuid,
}

/// Income/outcome totals derived from the stored entries. Never persisted;
/// always recomputed from the entry set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub income: Decimal,
    pub outcome: Decimal,
    pub total: Decimal,
}

impl Balance {
    pub fn zero() -> Self {
        Self { income: Decimal::ZERO, outcome: Decimal::ZERO, total: Decimal::ZERO }
    }

    /// Fold one entry into the running totals.
    pub fn apply(&mut self, kind: TransactionKind, value: Decimal) {
        match kind {
            TransactionKind::Income => self.income += value,
            TransactionKind::Outcome => self.outcome += value,
        }
        self.total = self.income - self.outcome;
    }
}

/// One page of the ledger plus the metadata the HTTP layer surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<models::transaction::Model>,
    pub balance: Balance,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_folds_both_kinds() {
        let mut b = Balance::zero();
        b.apply(TransactionKind::Income, Decimal::new(5000, 0));
        b.apply(TransactionKind::Outcome, Decimal::new(1200, 0));
        b.apply(TransactionKind::Income, Decimal::new(300, 0));
        assert_eq!(b.income, Decimal::new(5300, 0));
        assert_eq!(b.outcome, Decimal::new(1200, 0));
        assert_eq!(b.total, Decimal::new(4100, 0));
    }
}
