//! # huddle-store
//!
//! In-memory state of the Huddle client: the chat roster shown in the
//! sidebar and the message log of the open chat. Nothing here is persisted;
//! both stores start from a seed every time they are built.

pub mod log;
pub mod models;
pub mod roster;
pub mod seed;

mod error;

pub use error::{Result, StoreError};
pub use log::MessageLog;
pub use models::*;
pub use roster::Roster;
