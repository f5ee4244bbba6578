//! Directed, capacitated trust graph.
//!
//! An edge `creditor -> debtor` records how much the creditor is willing to
//! extend (`capacity`) and how much the debtor currently owes on it (`flow`).
//! Edges are created on the first capacity adjustment and never removed.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::{AccountId, Error, Money, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrustEdge {
    pub capacity: Money,
    pub flow: Money,
}

impl TrustEdge {
    /// `0 <= flow <= capacity` holds for every stored edge, so this cannot overflow.
    pub fn remaining(&self) -> Money {
        Money(self.capacity.0 - self.flow.0)
    }
}

#[derive(Debug, Default, Clone)]
pub struct TrustGraph {
    // creditor -> debtor -> edge
    successors: HashMap<AccountId, BTreeMap<AccountId, TrustEdge>>,
    // debtor -> creditors
    predecessors: HashMap<AccountId, BTreeSet<AccountId>>,
}

impl TrustGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge(&self, creditor: &AccountId, debtor: &AccountId) -> Option<&TrustEdge> {
        self.successors.get(creditor)?.get(debtor)
    }

    pub fn capacity(&self, creditor: &AccountId, debtor: &AccountId) -> Money {
        self.edge(creditor, debtor)
            .map(|e| e.capacity)
            .unwrap_or_default()
    }

    pub fn flow(&self, creditor: &AccountId, debtor: &AccountId) -> Money {
        self.edge(creditor, debtor).map(|e| e.flow).unwrap_or_default()
    }

    pub fn remaining_capacity(&self, creditor: &AccountId, debtor: &AccountId) -> Money {
        self.edge(creditor, debtor)
            .map(TrustEdge::remaining)
            .unwrap_or_default()
    }

    /// Capacity the edge would have after `delta`, or why it can't.
    pub fn check_capacity(
        &self,
        creditor: &AccountId,
        debtor: &AccountId,
        delta: Money,
    ) -> Result<Money> {
        let edge = self.edge(creditor, debtor).copied().unwrap_or_default();
        let capacity = edge.capacity.checked_add(delta).ok_or(Error::Overflow)?;

        if capacity < edge.flow {
            return Err(Error::InvalidTrustDecrease {
                creditor: creditor.clone(),
                debtor: debtor.clone(),
                capacity,
                flow: edge.flow,
            });
        }

        Ok(capacity)
    }

    /// Flow the edge would carry after `delta`, or why it can't.
    pub fn check_flow(
        &self,
        creditor: &AccountId,
        debtor: &AccountId,
        delta: Money,
    ) -> Result<Money> {
        let edge = self.edge(creditor, debtor).copied().unwrap_or_default();
        let flow = edge.flow.checked_add(delta).ok_or(Error::Overflow)?;

        if flow > edge.capacity {
            return Err(Error::InsufficientCapacity {
                creditor: creditor.clone(),
                debtor: debtor.clone(),
                requested: delta,
                remaining: edge.remaining(),
            });
        }
        if flow.is_negative() {
            return Err(Error::InsufficientDebt {
                creditor: creditor.clone(),
                debtor: debtor.clone(),
                requested: Money(delta.0.saturating_neg()),
                outstanding: edge.flow,
            });
        }

        Ok(flow)
    }

    pub fn adjust_capacity(
        &mut self,
        creditor: &AccountId,
        debtor: &AccountId,
        delta: Money,
    ) -> Result<()> {
        let capacity = self.check_capacity(creditor, debtor, delta)?;

        self.successors
            .entry(creditor.clone())
            .or_default()
            .entry(debtor.clone())
            .or_default()
            .capacity = capacity;
        self.predecessors
            .entry(debtor.clone())
            .or_default()
            .insert(creditor.clone());

        Ok(())
    }

    /// Updates flow on an existing edge. A missing edge has zero capacity, so
    /// any non-zero delta against it is rejected by the check.
    pub fn adjust_flow(
        &mut self,
        creditor: &AccountId,
        debtor: &AccountId,
        delta: Money,
    ) -> Result<()> {
        let flow = self.check_flow(creditor, debtor, delta)?;

        if let Some(edge) = self
            .successors
            .get_mut(creditor)
            .and_then(|debtors| debtors.get_mut(debtor))
        {
            edge.flow = flow;
        }

        Ok(())
    }

    /// Accounts `user` extends trust to.
    pub fn successors<'a>(
        &'a self,
        user: &AccountId,
    ) -> impl Iterator<Item = (&'a AccountId, &'a TrustEdge)> + use<'a> {
        self.successors
            .get(user)
            .into_iter()
            .flat_map(|debtors| debtors.iter())
    }

    /// Accounts extending trust to `user`.
    pub fn predecessors<'a>(&'a self, user: &AccountId) -> impl Iterator<Item = &'a AccountId> + use<'a> {
        self.predecessors
            .get(user)
            .into_iter()
            .flat_map(|creditors| creditors.iter())
    }

    /// Every edge as `(creditor, debtor, edge)`.
    pub fn edges(&self) -> impl Iterator<Item = (&AccountId, &AccountId, &TrustEdge)> {
        self.successors.iter().flat_map(|(creditor, debtors)| {
            debtors.iter().map(move |(debtor, edge)| (creditor, debtor, edge))
        })
    }

    /// Sum of flow lent out by `user`.
    pub fn lent(&self, user: &AccountId) -> Result<Money> {
        Money::checked_sum(self.successors(user).map(|(_, edge)| edge.flow)).ok_or(Error::Overflow)
    }

    /// Sum of flow borrowed in by `user`.
    pub fn borrowed(&self, user: &AccountId) -> Result<Money> {
        Money::checked_sum(
            self.predecessors(user)
                .map(|creditor| self.flow(creditor, user)),
        )
        .ok_or(Error::Overflow)
    }

    pub fn total_flow(&self) -> Result<Money> {
        Money::checked_sum(self.edges().map(|(_, _, edge)| edge.flow)).ok_or(Error::Overflow)
    }

    /// Inserts a fully formed edge, used when restoring from a snapshot.
    pub(crate) fn insert_edge(&mut self, creditor: AccountId, debtor: AccountId, edge: TrustEdge) {
        self.predecessors
            .entry(debtor.clone())
            .or_default()
            .insert(creditor.clone());
        self.successors.entry(creditor).or_default().insert(debtor, edge);
    }
}
