pub mod account;
pub mod action;
pub mod error;
pub mod money;
pub mod traits;

pub use account::{AccountId, AccountSummary};
pub use action::{Action, ActionKind, Deltas};
pub use error::{Error, Result};
pub use money::Money;
pub use traits::{ActionStream, DeadLetterQueue, Protocol};
