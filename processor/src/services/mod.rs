//! Service implementations
//!
//! This module contains real implementations of the service traits.
//! These are the production implementations that handle actual I/O operations.

pub mod file_store;

#[cfg(test)]
mod tests;

pub use file_store::RealFileStore;
