//! # huddle-shared
//!
//! Types shared by every Huddle crate: identifiers, realtime wire events,
//! validation errors and protocol constants.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod types;

pub use error::{ProtocolError, ValidationError};
