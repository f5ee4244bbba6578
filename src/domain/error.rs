use crate::domain::{AccountId, Money};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("Ingestion failed with: {0}")]
    Ingestion(String),

    #[error("Snapshot failed with: {0}")]
    Snapshot(String),

    #[error("Configuration failed with: {0}")]
    Config(String),

    #[error("user {user} is not registered")]
    UnregisteredUser { user: AccountId },

    #[error("user {user} is already registered")]
    AlreadyRegistered { user: AccountId },

    #[error("insufficient balance for {user}: requested {requested}, available {available}")]
    InsufficientBalance {
        user: AccountId,
        requested: Money,
        available: Money,
    },

    #[error(
        "insufficient capacity on {creditor} -> {debtor}: requested {requested}, remaining {remaining}"
    )]
    InsufficientCapacity {
        creditor: AccountId,
        debtor: AccountId,
        requested: Money,
        remaining: Money,
    },

    #[error(
        "insufficient debt on {creditor} -> {debtor}: repaying {requested}, outstanding {outstanding}"
    )]
    InsufficientDebt {
        creditor: AccountId,
        debtor: AccountId,
        requested: Money,
        outstanding: Money,
    },

    #[error("invalid trust decrease on {creditor} -> {debtor}: capacity {capacity} below flow {flow}")]
    InvalidTrustDecrease {
        creditor: AccountId,
        debtor: AccountId,
        capacity: Money,
        flow: Money,
    },

    #[error("credit limit of {user} is {limit}, requested {requested}")]
    InsufficientCreditLimit {
        user: AccountId,
        requested: Money,
        limit: Money,
    },

    #[error("{user} owes {outstanding} in total, cannot repay {requested}")]
    ExcessRepayment {
        user: AccountId,
        requested: Money,
        outstanding: Money,
    },

    #[error("negative amount {amount} for {user}")]
    NegativeAmount { user: AccountId, amount: Money },

    #[error("user {user} cannot trust itself")]
    SelfReference { user: AccountId },

    #[error("amount overflow")]
    Overflow,
}
