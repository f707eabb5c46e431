//! moneta-domain
//!
//! Pure domain models for the budgeting engine: immutable value records
//! (Account, Category, CategoryGroup, Transaction), repeating spending rules,
//! the Budget aggregate with its structural invariants, and the derived
//! balance tables. No I/O, no CLI, no storage. Every structural mutation
//! returns a new value; the old one stays valid.

pub mod account;
mod balances;
pub mod budget;
pub mod category;
pub mod currency;
pub mod date;
pub mod error;
pub mod record;
pub mod rule;
pub mod transaction;
pub mod validation;

pub use account::*;
pub use budget::*;
pub use category::*;
pub use currency::*;
pub use date::*;
pub use error::*;
pub use record::*;
pub use rule::*;
pub use transaction::*;
pub use validation::*;
