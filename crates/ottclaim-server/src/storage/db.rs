//! SQLite database handle for the `OTTclaim` server.

pub use ottclaim_core::db::DatabaseError;

ottclaim_core::define_database!(ClaimDatabase, "Claim database migrations complete");
