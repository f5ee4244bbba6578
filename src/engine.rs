use crate::domain::{
    Action, ActionKind, Error,
    traits::{ActionStream, DeadLetterQueue, Protocol},
};

use futures::StreamExt;
use tracing::{debug, info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub applied: usize,
    pub rejected: usize,
}

/// Replays an action stream against a ledger. Failed actions go to the
/// dead-letter queue and processing continues.
#[derive(Debug)]
pub struct Engine<I, P, D>
where
    I: ActionStream,
    P: Protocol,
    D: DeadLetterQueue,
{
    ingestion: I,
    ledger: P,
    dlq: D,
}

impl<I, P, D> Engine<I, P, D>
where
    I: ActionStream,
    P: Protocol,
    D: DeadLetterQueue,
{
    pub fn new(ingestion: I, ledger: P, dlq: D) -> Self {
        Self {
            ingestion,
            ledger,
            dlq,
        }
    }

    pub async fn process(&mut self) -> Result<RunStats, Error> {
        let mut res = self.ingestion.stream();
        let mut stats = RunStats::default();

        while let Some(action) = res.next().await {
            match action.and_then(|action| self.apply_action(&action)) {
                Ok(()) => stats.applied += 1,
                Err(e) => {
                    stats.rejected += 1;
                    self.dlq.report(&e);
                }
            }
        }

        match (self.ledger.total_value_locked(), self.ledger.total_debt()) {
            (Ok(tvl), Ok(debt)) => info!(
                applied = stats.applied,
                rejected = stats.rejected,
                %tvl,
                %debt,
                "actions processed"
            ),
            (tvl, debt) => warn!(
                applied = stats.applied,
                rejected = stats.rejected,
                tvl = ?tvl.err(),
                debt = ?debt.err(),
                "actions processed, totals unavailable"
            ),
        }
        Ok(stats)
    }

    fn apply_action(&mut self, action: &Action) -> Result<(), Error> {
        debug!(%action, "applying");
        let user = &action.user;
        match &action.kind {
            ActionKind::Register => self.ledger.register(user),
            ActionKind::Deposit { amount } => self.ledger.deposit(user, *amount),
            ActionKind::Withdraw { amount } => self.ledger.withdraw(user, *amount),
            ActionKind::Transfer { amount, recipient } => {
                self.ledger.transfer(user, *amount, recipient)
            }
            ActionKind::SetTrust { deltas } => self.ledger.set_trust(user, deltas),
            ActionKind::Borrow { deltas } => self.ledger.borrow(user, deltas),
            ActionKind::Repay { deltas } => self.ledger.repay(user, deltas),
            ActionKind::BorrowOrRepay { deltas } => self.ledger.borrow_or_repay(user, deltas),
            ActionKind::BorrowAmount { amount } => {
                self.ledger.borrow_amount(user, *amount).map(|_| ())
            }
            ActionKind::RepayAmount { amount } => {
                self.ledger.repay_amount(user, *amount).map(|_| ())
            }
        }
    }

    pub fn ledger(&self) -> &P {
        &self.ledger
    }

    pub fn into_ledger(self) -> P {
        self.ledger
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::domain::{AccountId, Deltas, Money};
    use crate::ingestion::CsvReader;
    use crate::ledger::Ledger;

    #[derive(Default)]
    struct CollectingDLQ {
        errors: RefCell<Vec<String>>,
    }

    impl DeadLetterQueue for &CollectingDLQ {
        fn report(&self, error: &Error) {
            self.errors.borrow_mut().push(error.to_string());
        }
    }

    #[tokio::test]
    async fn applies_actions_and_reports_failures() {
        let csv = "type,user,amount,counterparty\n\
                   register,alice,,\n\
                   register,bob,,\n\
                   register,bob,,\n\
                   trust,bob,50,alice\n\
                   deposit,bob,200,\n\
                   borrow,alice,51,bob\n\
                   borrow,alice,50,bob\n\
                   repay,alice,20,bob\n\
                   borrow_or_repay,alice,,bob:-31\n\
                   borrow_or_repay,alice,,bob:-5\n\
                   bogus,alice,,\n";
        let dlq = CollectingDLQ::default();
        let mut engine = Engine::new(CsvReader::new(csv.as_bytes()), Ledger::new(), &dlq);

        let stats = engine.process().await.unwrap();
        assert_eq!(stats, RunStats { applied: 7, rejected: 4 });

        let errors = dlq.errors.borrow();
        assert!(errors[0].contains("already registered"));
        assert!(errors[1].contains("insufficient capacity"));
        assert!(errors[2].contains("insufficient debt"));
        assert!(errors[3].contains("Invalid action type"));

        let ledger = engine.into_ledger();
        assert_eq!(
            ledger.debt(&AccountId::new("alice")).unwrap(),
            Deltas::from([(AccountId::new("bob"), Money(25))])
        );
    }
}
