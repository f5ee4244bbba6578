//! Ledger facade over the trust graph and free balances.
//!
//! Batched operations validate every entry before touching any edge, so a
//! failed call leaves the ledger exactly as it was.

use std::collections::BTreeMap;

use tracing::debug;

use crate::accounts::{AccountLedger, ensure_non_negative};
use crate::allocator::split_proportionally;
use crate::domain::{AccountId, AccountSummary, Deltas, Error, Money, Protocol, Result};
use crate::graph::TrustGraph;

#[derive(Debug, Default, Clone)]
pub struct Ledger {
    accounts: AccountLedger,
    graph: TrustGraph,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(accounts: AccountLedger, graph: TrustGraph) -> Self {
        Self { accounts, graph }
    }

    pub fn accounts(&self) -> &AccountLedger {
        &self.accounts
    }

    pub fn graph(&self) -> &TrustGraph {
        &self.graph
    }

    pub fn free_balance(&self, user: &AccountId) -> Result<Money> {
        self.accounts.free_balance(user)
    }

    /// The most `debtor` could still draw from `creditor`: unused trust,
    /// bounded by what the creditor actually has available.
    pub fn edge_credit_limit(&self, creditor: &AccountId, debtor: &AccountId) -> Result<Money> {
        let available = self.accounts.available_balance(&self.graph, creditor)?;
        Ok(self
            .graph
            .remaining_capacity(creditor, debtor)
            .min(available)
            .non_negative())
    }

    pub fn summary(&self, user: &AccountId) -> Result<AccountSummary> {
        Ok(AccountSummary {
            user: user.clone(),
            free: self.accounts.free_balance(user)?,
            available: self.available_balance(user)?,
            credit_limit: self.credit_limit(user)?,
            debt: self.graph.borrowed(user)?,
            lent: self.graph.lent(user)?,
        })
    }

    /// Summaries of every account, ordered by id.
    pub fn summaries(&self) -> Result<Vec<AccountSummary>> {
        let mut users: Vec<&AccountId> = self.accounts.iter().map(|(user, _)| user).collect();
        users.sort();
        users.into_iter().map(|user| self.summary(user)).collect()
    }

    fn creditor_limits(&self, user: &AccountId) -> Result<(Vec<AccountId>, Vec<Money>)> {
        let creditors: Vec<AccountId> = self.graph.predecessors(user).cloned().collect();
        let limits = creditors
            .iter()
            .map(|creditor| self.edge_credit_limit(creditor, user))
            .collect::<Result<Vec<_>>>()?;
        Ok((creditors, limits))
    }
}

/// `base + net`, if it still fits.
fn shifted(base: Money, net: i128) -> Result<Money> {
    i64::try_from(i128::from(base.as_minor()) + net)
        .map(Money)
        .map_err(|_| Error::Overflow)
}

fn non_zero_shares(creditors: Vec<AccountId>, shares: Vec<Money>) -> Deltas {
    creditors
        .into_iter()
        .zip(shares)
        .filter(|(_, share)| *share != Money::ZERO)
        .collect()
}

impl Protocol for Ledger {
    fn register(&mut self, user: &AccountId) -> Result<()> {
        self.accounts.register(user)?;
        debug!(%user, "registered");
        Ok(())
    }

    fn deposit(&mut self, user: &AccountId, amount: Money) -> Result<()> {
        self.accounts.deposit(&self.graph, user, amount)?;
        debug!(%user, %amount, "deposited");
        Ok(())
    }

    fn withdraw(&mut self, user: &AccountId, amount: Money) -> Result<()> {
        self.accounts.withdraw(&self.graph, user, amount)?;
        debug!(%user, %amount, "withdrew");
        Ok(())
    }

    fn transfer(&mut self, user: &AccountId, amount: Money, recipient: &AccountId) -> Result<()> {
        self.accounts.ensure_registered(recipient)?;
        self.accounts.check_withdraw(&self.graph, user, amount)?;
        if user != recipient {
            self.accounts
                .free_balance(recipient)?
                .checked_add(amount)
                .ok_or(Error::Overflow)?;
            self.accounts
                .available_balance(&self.graph, recipient)?
                .checked_add(amount)
                .ok_or(Error::Overflow)?;
        }

        self.accounts.withdraw(&self.graph, user, amount)?;
        self.accounts.deposit(&self.graph, recipient, amount)?;
        debug!(%user, %amount, %recipient, "transferred");
        Ok(())
    }

    fn set_trust(&mut self, user: &AccountId, deltas: &Deltas) -> Result<()> {
        self.accounts.ensure_registered(user)?;
        for (neighbor, delta) in deltas {
            if neighbor == user {
                return Err(Error::SelfReference { user: user.clone() });
            }
            self.accounts.ensure_registered(neighbor)?;
            self.graph.check_capacity(user, neighbor, *delta)?;
        }

        for (neighbor, delta) in deltas {
            self.graph.adjust_capacity(user, neighbor, *delta)?;
            debug!(creditor = %user, debtor = %neighbor, %delta, "trust adjusted");
        }
        Ok(())
    }

    fn borrow_or_repay(&mut self, user: &AccountId, deltas: &Deltas) -> Result<()> {
        self.accounts.ensure_registered(user)?;
        let mut drawn: i128 = 0;
        let mut repaid: i128 = 0;
        for (creditor, delta) in deltas {
            self.accounts.ensure_registered(creditor)?;
            self.graph.check_flow(creditor, user, *delta)?;

            let available = self.accounts.available_balance(&self.graph, creditor)?;
            if *delta > Money::ZERO {
                if *delta > available {
                    return Err(Error::InsufficientBalance {
                        user: creditor.clone(),
                        requested: *delta,
                        available,
                    });
                }
                shifted(self.graph.lent(creditor)?, i128::from(delta.as_minor()))?;
                drawn += i128::from(delta.as_minor());
            } else {
                let amount = delta.checked_neg().ok_or(Error::Overflow)?;
                available.checked_add(amount).ok_or(Error::Overflow)?;
                repaid += i128::from(amount.as_minor());
            }
        }

        let available = self.accounts.available_balance(&self.graph, user)?;
        if repaid > i128::from(available.as_minor()) {
            return Err(Error::InsufficientBalance {
                user: user.clone(),
                requested: Money(i64::try_from(repaid).unwrap_or(i64::MAX)),
                available,
            });
        }

        // flows can cycle without new deposits, so the aggregates are bounded separately
        let net = drawn - repaid;
        shifted(available, net)?;
        shifted(self.graph.borrowed(user)?, net)?;
        shifted(self.graph.total_flow()?, net)?;

        for (creditor, delta) in deltas {
            self.graph.adjust_flow(creditor, user, *delta)?;
            if delta.is_negative() {
                debug!(%creditor, debtor = %user, amount = %delta.as_minor().unsigned_abs(), "repaid");
            } else {
                debug!(%creditor, debtor = %user, amount = %delta, "borrowed");
            }
        }
        Ok(())
    }

    fn borrow(&mut self, user: &AccountId, deltas: &Deltas) -> Result<()> {
        for delta in deltas.values() {
            ensure_non_negative(user, *delta)?;
        }
        self.borrow_or_repay(user, deltas)
    }

    fn repay(&mut self, user: &AccountId, deltas: &Deltas) -> Result<()> {
        let flipped = deltas
            .iter()
            .map(|(creditor, delta)| {
                ensure_non_negative(user, *delta)?;
                Ok((creditor.clone(), delta.checked_neg().ok_or(Error::Overflow)?))
            })
            .collect::<Result<Deltas>>()?;
        self.borrow_or_repay(user, &flipped)
    }

    fn borrow_amount(&mut self, user: &AccountId, amount: Money) -> Result<Deltas> {
        self.accounts.ensure_registered(user)?;
        ensure_non_negative(user, amount)?;

        let (creditors, limits) = self.creditor_limits(user)?;
        let shares = split_proportionally(amount, &limits).ok_or_else(|| {
            Error::InsufficientCreditLimit {
                user: user.clone(),
                requested: amount,
                limit: Money::checked_sum(limits.iter().copied()).unwrap_or(Money(i64::MAX)),
            }
        })?;

        let deltas = non_zero_shares(creditors, shares);
        self.borrow(user, &deltas)?;
        Ok(deltas)
    }

    fn repay_amount(&mut self, user: &AccountId, amount: Money) -> Result<Deltas> {
        self.accounts.ensure_registered(user)?;
        ensure_non_negative(user, amount)?;

        let creditors: Vec<AccountId> = self.graph.predecessors(user).cloned().collect();
        let owed: Vec<Money> = creditors
            .iter()
            .map(|creditor| self.graph.flow(creditor, user))
            .collect();
        let shares =
            split_proportionally(amount, &owed).ok_or_else(|| Error::ExcessRepayment {
                user: user.clone(),
                requested: amount,
                outstanding: Money::checked_sum(owed.iter().copied())
                    .unwrap_or(Money(i64::MAX)),
            })?;

        let deltas = non_zero_shares(creditors, shares);
        self.repay(user, &deltas)?;
        Ok(deltas)
    }

    fn available_balance(&self, user: &AccountId) -> Result<Money> {
        self.accounts.available_balance(&self.graph, user)
    }

    fn credit_limit(&self, user: &AccountId) -> Result<Money> {
        self.accounts.ensure_registered(user)?;
        let (_, limits) = self.creditor_limits(user)?;
        Money::checked_sum(limits).ok_or(Error::Overflow)
    }

    fn trusted(&self, user: &AccountId) -> Result<BTreeMap<AccountId, Money>> {
        self.accounts.ensure_registered(user)?;
        Ok(self
            .graph
            .successors(user)
            .map(|(debtor, edge)| (debtor.clone(), edge.capacity))
            .collect())
    }

    fn locked(&self, user: &AccountId) -> Result<BTreeMap<AccountId, Money>> {
        self.accounts.ensure_registered(user)?;
        Ok(self
            .graph
            .successors(user)
            .map(|(debtor, edge)| (debtor.clone(), edge.flow))
            .collect())
    }

    fn debt(&self, user: &AccountId) -> Result<BTreeMap<AccountId, Money>> {
        self.accounts.ensure_registered(user)?;
        Ok(self
            .graph
            .predecessors(user)
            .map(|creditor| (creditor.clone(), self.graph.flow(creditor, user)))
            .collect())
    }

    fn total_value_locked(&self) -> Result<Money> {
        self.accounts.total_value_locked()
    }

    fn total_debt(&self) -> Result<Money> {
        self.graph.total_flow()
    }
}
