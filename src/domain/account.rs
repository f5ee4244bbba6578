use serde::{Deserialize, Serialize};

use crate::domain::Money;

/// Opaque account key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point-in-time view of one account, as reported after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub user: AccountId,
    pub free: Money,      // deposited minus withdrawn/transferred
    pub available: Money, // free - lent + borrowed
    pub credit_limit: Money,
    pub debt: Money, // borrowed from creditors
    pub lent: Money, // drawn by debtors
}
