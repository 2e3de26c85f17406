//! SQLite storage for the `OTTclaim` server.
//!
//! Provides persistence for claims, sales records and OTT keys.

mod db;
mod models;
mod queries_claims;
mod queries_keys;
mod queries_sales;

#[cfg(test)]
mod tests;

pub use db::{ClaimDatabase, DatabaseError};
pub use models::*;
pub use queries_claims::{ClaimFilter, NewClaim};
pub use queries_keys::KeyMatch;
