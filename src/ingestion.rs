use std::io::Read;
use std::pin::Pin;

use futures::stream::{self, Stream};
use serde::Deserialize;

use crate::domain::traits::ActionStream;
use crate::domain::{AccountId, Action, ActionKind, Deltas, Error, Money, Result};

pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Self {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Self { reader: Some(rdr) }
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "type")]
    kind: String,
    user: String,
    #[serde(default)]
    amount: Option<Money>,
    #[serde(default)]
    counterparty: Option<String>,
}

/// Parses `bob:50;carol:-10`.
fn parse_deltas(list: &str) -> Result<Deltas> {
    let mut deltas = Deltas::new();
    for entry in list.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (neighbor, delta) = entry
            .split_once(':')
            .ok_or_else(|| Error::Ingestion(format!("Expected neighbor:amount, got {}", entry)))?;
        let delta: Money = delta
            .parse()
            .map_err(|e| Error::Ingestion(format!("Invalid amount in {}: {}", entry, e)))?;
        if deltas.insert(AccountId::new(neighbor.trim()), delta).is_some() {
            return Err(Error::Ingestion(format!("Duplicate neighbor {}", neighbor.trim())));
        }
    }
    if deltas.is_empty() {
        return Err(Error::Ingestion("Empty neighbor list".to_string()));
    }
    Ok(deltas)
}

/// Single `amount` + `counterparty` pair, or a `neighbor:amount` list in `counterparty`.
fn deltas_of(amount: Option<Money>, counterparty: Option<&str>) -> Result<Option<Deltas>> {
    match (amount, counterparty) {
        (Some(amount), Some(neighbor)) => {
            Ok(Some(Deltas::from([(AccountId::new(neighbor), amount)])))
        }
        (None, Some(list)) => parse_deltas(list).map(Some),
        (_, None) => Ok(None),
    }
}

impl TryFrom<CsvRow> for Action {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let counterparty = row.counterparty.as_deref().filter(|c| !c.is_empty());
        let kind = match (row.kind.trim().to_ascii_lowercase().as_str(), row.amount) {
            ("register", None) => ActionKind::Register,
            ("deposit", Some(amount)) => ActionKind::Deposit { amount },
            ("withdraw" | "withdrawal", Some(amount)) => ActionKind::Withdraw { amount },
            ("transfer", Some(amount)) => match counterparty {
                Some(recipient) => ActionKind::Transfer {
                    amount,
                    recipient: AccountId::new(recipient),
                },
                None => return Err(Error::Ingestion("Transfer without recipient".to_string())),
            },
            ("trust", amount) => match deltas_of(amount, counterparty)? {
                Some(deltas) => ActionKind::SetTrust { deltas },
                None => return Err(Error::Ingestion("Trust without neighbor".to_string())),
            },
            ("borrow", amount) => match (deltas_of(amount, counterparty)?, amount) {
                (Some(deltas), _) => ActionKind::Borrow { deltas },
                (None, Some(amount)) => ActionKind::BorrowAmount { amount },
                (None, None) => return Err(Error::Ingestion("Borrow without amount".to_string())),
            },
            ("repay", amount) => match (deltas_of(amount, counterparty)?, amount) {
                (Some(deltas), _) => ActionKind::Repay { deltas },
                (None, Some(amount)) => ActionKind::RepayAmount { amount },
                (None, None) => return Err(Error::Ingestion("Repay without amount".to_string())),
            },
            ("borrow_or_repay", amount) => match deltas_of(amount, counterparty)? {
                Some(deltas) => ActionKind::BorrowOrRepay { deltas },
                None => return Err(Error::Ingestion("Borrow_or_repay without creditor".to_string())),
            },
            (other, _) => {
                return Err(Error::Ingestion(format!(
                    "Invalid action type: {}",
                    other
                )));
            }
        };

        if row.user.is_empty() {
            return Err(Error::Ingestion("Missing user".to_string()));
        }

        Ok(Action {
            kind,
            user: AccountId::new(row.user),
        })
    }
}

impl<R: Read + Send + 'static> ActionStream for CsvReader<R> {
    type Actions = Pin<Box<dyn Stream<Item = Result<Action>> + Send>>;

    fn stream(&mut self) -> Self::Actions {
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                // Already consumed; return an empty stream.
                return Box::pin(stream::iter(Vec::<Result<Action>>::new()));
            }
        };

        let iter = reader
            .into_deserialize::<CsvRow>()
            .map(|row_res| match row_res {
                Ok(row) => Action::try_from(row),
                Err(e) => Err(Error::Ingestion(format!(
                    "CSV deserialization error: {}",
                    e
                ))),
            });

        Box::pin(stream::iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn read_all(csv: &'static str) -> Vec<Result<Action>> {
        let mut reader = CsvReader::new(csv.as_bytes());
        futures::executor::block_on(reader.stream().collect::<Vec<_>>())
    }

    fn deltas(entries: &[(&str, i64)]) -> Deltas {
        entries
            .iter()
            .map(|(k, v)| (AccountId::new(*k), Money(*v)))
            .collect()
    }

    #[test]
    fn parses_every_action_form() {
        let actions: Vec<Action> = read_all(
            "type, user, amount, counterparty\n\
             register, alice, ,\n\
             deposit, bob, 200,\n\
             withdraw, bob, 5,\n\
             transfer, bob, 10, alice\n\
             trust, bob, 50, alice\n\
             trust, bob, , alice:-5;carol:20\n\
             borrow, alice, 30, bob\n\
             borrow, alice, 12,\n\
             repay, alice, , bob:10\n\
             repay, alice, 4,\n\
             borrow_or_repay, alice, , bob:-10;carol:5\n",
        )
        .into_iter()
        .collect::<Result<_>>()
        .unwrap();

        let kinds: Vec<ActionKind> = actions.into_iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::Register,
                ActionKind::Deposit { amount: Money(200) },
                ActionKind::Withdraw { amount: Money(5) },
                ActionKind::Transfer {
                    amount: Money(10),
                    recipient: AccountId::new("alice"),
                },
                ActionKind::SetTrust { deltas: deltas(&[("alice", 50)]) },
                ActionKind::SetTrust { deltas: deltas(&[("alice", -5), ("carol", 20)]) },
                ActionKind::Borrow { deltas: deltas(&[("bob", 30)]) },
                ActionKind::BorrowAmount { amount: Money(12) },
                ActionKind::Repay { deltas: deltas(&[("bob", 10)]) },
                ActionKind::RepayAmount { amount: Money(4) },
                ActionKind::BorrowOrRepay { deltas: deltas(&[("bob", -10), ("carol", 5)]) },
            ]
        );
    }

    #[test]
    fn bad_rows_become_ingestion_errors() {
        let results = read_all(
            "type, user, amount, counterparty\n\
             deposit, alice, 1.5,\n\
             launder, alice, 10,\n\
             transfer, alice, 10,\n\
             trust, bob, , alice\n\
             borrow_or_repay, alice, 5,\n\
             deposit, alice, 7,\n",
        );

        assert_eq!(results.len(), 6);
        assert!(results[..5]
            .iter()
            .all(|r| matches!(r, Err(Error::Ingestion(_)))));
        assert!(results[5].is_ok());
    }

    #[test]
    fn stream_can_only_be_taken_once() {
        let mut reader = CsvReader::new("type,user,amount,counterparty\nregister,a,,\n".as_bytes());
        let first = futures::executor::block_on(reader.stream().collect::<Vec<_>>());
        let second = futures::executor::block_on(reader.stream().collect::<Vec<_>>());
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }
}
