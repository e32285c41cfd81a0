//! # DataStore Module
//!
//! Durable storage for channel videos and their enrichment state. One row
//! per video id; the pipeline relies on `upsert_video` being atomic per id
//! so a partially enriched row can be replaced on a later run without ever
//! producing duplicate billed work.
//!
//! The module uses sqlx for database operations and exposes the `DataStore`
//! trait so the pipeline can be exercised against in-memory fakes.

mod datastore;
mod domain;

pub use datastore::postgres::PgDataStore;
pub use datastore::DataStore;
pub use domain::{parse_iso8601_duration, Video};
