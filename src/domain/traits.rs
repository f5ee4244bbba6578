use std::collections::BTreeMap;

use futures::Stream;

use crate::domain::{AccountId, Action, Deltas, Error, Money, Result};

pub trait ActionStream {
    type Actions: Stream<Item = Result<Action>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::Actions;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

/// The operation set of a trust-based credit ledger.
///
/// Trust edges run creditor -> debtor. Every mutating call either commits
/// completely or fails leaving the ledger untouched.
pub trait Protocol {
    fn register(&mut self, user: &AccountId) -> Result<()>;

    fn deposit(&mut self, user: &AccountId, amount: Money) -> Result<()>;

    fn withdraw(&mut self, user: &AccountId, amount: Money) -> Result<()>;

    fn transfer(&mut self, user: &AccountId, amount: Money, recipient: &AccountId) -> Result<()>;

    /// Adjusts the capacity `user` extends to each neighbor.
    fn set_trust(&mut self, user: &AccountId, deltas: &Deltas) -> Result<()>;

    /// Moves debt on each creditor edge in one batch: a positive delta borrows,
    /// a negative one repays. Every entry must keep its flow within
    /// `[0, capacity]`, each draw must be covered by that creditor's available
    /// balance, and the debtor's available balance must cover the repayments.
    fn borrow_or_repay(&mut self, user: &AccountId, deltas: &Deltas) -> Result<()>;

    /// Draws on each creditor's trust; amounts must be non-negative.
    fn borrow(&mut self, user: &AccountId, deltas: &Deltas) -> Result<()>;

    /// Pays back each creditor; amounts must be non-negative. Fails with
    /// `InsufficientBalance` when the debtor's available balance can't cover the total.
    fn repay(&mut self, user: &AccountId, deltas: &Deltas) -> Result<()>;

    /// Borrows a single amount split across all creditors in proportion to their limits.
    fn borrow_amount(&mut self, user: &AccountId, amount: Money) -> Result<Deltas>;

    /// Repays a single amount split across all creditors in proportion to the debt owed.
    fn repay_amount(&mut self, user: &AccountId, amount: Money) -> Result<Deltas>;

    fn available_balance(&self, user: &AccountId) -> Result<Money>;

    fn credit_limit(&self, user: &AccountId) -> Result<Money>;

    fn trusted(&self, user: &AccountId) -> Result<BTreeMap<AccountId, Money>>;

    fn locked(&self, user: &AccountId) -> Result<BTreeMap<AccountId, Money>>;

    fn debt(&self, user: &AccountId) -> Result<BTreeMap<AccountId, Money>>;

    fn total_value_locked(&self) -> Result<Money>;

    fn total_debt(&self) -> Result<Money>;
}
