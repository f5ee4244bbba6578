use std::collections::BTreeMap;

use crate::domain::{AccountId, Money};

/// Per-neighbor adjustments applied as one batch.
pub type Deltas = BTreeMap<AccountId, Money>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Register,
    Deposit { amount: Money },
    Withdraw { amount: Money },
    Transfer { amount: Money, recipient: AccountId },
    SetTrust { deltas: Deltas },
    Borrow { deltas: Deltas },
    BorrowAmount { amount: Money },
    Repay { deltas: Deltas },
    BorrowOrRepay { deltas: Deltas },
    RepayAmount { amount: Money },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub user: AccountId,
}

fn fmt_deltas(f: &mut core::fmt::Formatter<'_>, deltas: &Deltas) -> core::fmt::Result {
    let mut first = true;
    for (neighbor, delta) in deltas {
        if !first {
            f.write_str(";")?;
        }
        write!(f, "{}:{}", neighbor, delta)?;
        first = false;
    }
    Ok(())
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.kind {
            ActionKind::Register => write!(f, "register,user={}", self.user),
            ActionKind::Deposit { amount } => write!(f, "deposit,user={},amount={}", self.user, amount),
            ActionKind::Withdraw { amount } => {
                write!(f, "withdraw,user={},amount={}", self.user, amount)
            }
            ActionKind::Transfer { amount, recipient } => write!(
                f,
                "transfer,user={},amount={},to={}",
                self.user, amount, recipient
            ),
            ActionKind::BorrowAmount { amount } => {
                write!(f, "borrow,user={},amount={}", self.user, amount)
            }
            ActionKind::RepayAmount { amount } => {
                write!(f, "repay,user={},amount={}", self.user, amount)
            }
            ActionKind::SetTrust { deltas } => {
                write!(f, "trust,user={},deltas=", self.user)?;
                fmt_deltas(f, deltas)
            }
            ActionKind::Borrow { deltas } => {
                write!(f, "borrow,user={},deltas=", self.user)?;
                fmt_deltas(f, deltas)
            }
            ActionKind::Repay { deltas } => {
                write!(f, "repay,user={},deltas=", self.user)?;
                fmt_deltas(f, deltas)
            }
            ActionKind::BorrowOrRepay { deltas } => {
                write!(f, "borrow_or_repay,user={},deltas=", self.user)?;
                fmt_deltas(f, deltas)
            }
        }
    }
}
