//! Shared record model, errors and logging for the data processing workspace
//!
//! Holds the types every component agrees on: records and collections,
//! the shared error type, and tracing setup with the bounded activity log.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use logging::{ActivityEntry, ActivityLayer, ActivityLog};
pub use types::*;
