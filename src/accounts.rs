use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::domain::{AccountId, Error, Money, Result};
use crate::graph::TrustGraph;

/// Free balances: money deposited and not yet withdrawn or transferred away.
/// Trust edges never touch these; borrowing is accounted for on the graph.
#[derive(Default, Debug, Clone)]
pub struct AccountLedger {
    balances: HashMap<AccountId, Money>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    pub fn register(&mut self, user: &AccountId) -> Result<()> {
        match self.balances.entry(user.clone()) {
            Entry::Vacant(e) => {
                e.insert(Money::ZERO);
                Ok(())
            }
            Entry::Occupied(_) => Err(Error::AlreadyRegistered { user: user.clone() }),
        }
    }

    pub fn contains(&self, user: &AccountId) -> bool {
        self.balances.contains_key(user)
    }

    pub fn ensure_registered(&self, user: &AccountId) -> Result<()> {
        if self.contains(user) {
            Ok(())
        } else {
            Err(Error::UnregisteredUser { user: user.clone() })
        }
    }

    pub fn free_balance(&self, user: &AccountId) -> Result<Money> {
        self.balances
            .get(user)
            .copied()
            .ok_or_else(|| Error::UnregisteredUser { user: user.clone() })
    }

    /// Own funds, minus what `user` has lent out, plus what it has borrowed in.
    pub fn available_balance(&self, graph: &TrustGraph, user: &AccountId) -> Result<Money> {
        let free = i128::from(self.free_balance(user)?.as_minor());
        let lent = i128::from(graph.lent(user)?.as_minor());
        let borrowed = i128::from(graph.borrowed(user)?.as_minor());

        i64::try_from(free - lent + borrowed)
            .map(Money)
            .map_err(|_| Error::Overflow)
    }

    /// Rejects the deposit if it would leave the user's free or available
    /// balance, or the total value locked, unrepresentable.
    pub fn deposit(&mut self, graph: &TrustGraph, user: &AccountId, amount: Money) -> Result<()> {
        ensure_non_negative(user, amount)?;
        self.available_balance(graph, user)?
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        self.total_value_locked()?
            .checked_add(amount)
            .ok_or(Error::Overflow)?;

        let balance = self
            .balances
            .get_mut(user)
            .ok_or_else(|| Error::UnregisteredUser { user: user.clone() })?;

        *balance = balance.checked_add(amount).ok_or(Error::Overflow)?;
        Ok(())
    }

    /// Checks that `amount` could be withdrawn without applying it.
    pub fn check_withdraw(&self, graph: &TrustGraph, user: &AccountId, amount: Money) -> Result<()> {
        ensure_non_negative(user, amount)?;
        let available = self.available_balance(graph, user)?;

        if amount > available {
            return Err(Error::InsufficientBalance {
                user: user.clone(),
                requested: amount,
                available,
            });
        }

        Ok(())
    }

    pub fn withdraw(&mut self, graph: &TrustGraph, user: &AccountId, amount: Money) -> Result<()> {
        self.check_withdraw(graph, user, amount)?;
        let balance = self
            .balances
            .get_mut(user)
            .ok_or_else(|| Error::UnregisteredUser { user: user.clone() })?;

        *balance = balance.checked_sub(amount).ok_or(Error::Overflow)?;
        Ok(())
    }

    pub fn total_value_locked(&self) -> Result<Money> {
        Money::checked_sum(self.balances.values().copied()).ok_or(Error::Overflow)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &Money)> {
        self.balances.iter()
    }

    /// Inserts or replaces a balance, used when restoring from a snapshot.
    pub(crate) fn insert(&mut self, user: AccountId, balance: Money) {
        self.balances.insert(user, balance);
    }
}

pub(crate) fn ensure_non_negative(user: &AccountId, amount: Money) -> Result<()> {
    if amount.is_negative() {
        return Err(Error::NegativeAmount {
            user: user.clone(),
            amount,
        });
    }
    Ok(())
}
