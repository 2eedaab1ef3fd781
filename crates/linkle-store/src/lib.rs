//! # linkle-store
//!
//! Device-local storage for Linkle, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for listings,
//! membership sets, the organizer inbox, account settings, follow state and
//! reviews.  All per-device state lives in one file.

pub mod backup;
pub mod database;
pub mod follows;
pub mod listings;
pub mod memberships;
pub mod migrations;
pub mod models;
pub mod notifications;
pub mod reviews;
pub mod settings;

mod error;

pub use backup::{ImportStats, Snapshot, SnapshotMemberships};
pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
