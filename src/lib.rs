//! Trust-based credit ledger.
//!
//! Accounts hold a free balance and extend directed, capacitated trust to one
//! another. A debtor may borrow against unused trust up to what the creditor
//! has available; the outstanding amount is the flow on the trust edge.

pub mod accounts;
pub mod allocator;
pub mod config;
pub mod dlq;
pub mod domain;
pub mod engine;
pub mod graph;
pub mod ingestion;
pub mod ledger;
pub mod output;
pub mod snapshot;

pub use domain::{AccountId, Deltas, Error, Money, Protocol, Result};
pub use ledger::Ledger;
