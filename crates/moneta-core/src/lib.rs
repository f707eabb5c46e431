//! moneta-core
//!
//! The command layer over the budget model: a fixed command set, a pure
//! reducer applying commands to a [`moneta_domain::Budget`], and an inverter
//! that synthesizes, for any command over a given state, the command that
//! undoes it exactly. Depends on moneta-domain only; no I/O.

pub mod command;
pub mod error;
pub mod inverter;
pub mod reducer;

pub use command::{Command, DetailRef};
pub use error::EngineError;
pub use inverter::invert;
pub use reducer::reduce;
