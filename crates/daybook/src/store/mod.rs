//! SQLite-backed document store for entries and tasks.
//!
//! # Data model
//!
//! - `entries` — one row per calendar day, keyed by `date` (`YYYY-MM-DD`).
//!   Created implicitly on first save, updated by upsert, never deleted.
//! - `tasks` — the checklist. Every sync replaces the whole table inside one
//!   transaction; reads return rows ordered by the client-maintained `"order"`
//!   column.
//!
//! The store wraps a single connection in an async mutex and hands out cheap
//! clones; requests serialise at the store. There is no per-date locking and
//! no conflict detection — concurrent writers last-write-win.

pub mod db;

pub use db::{Store, StoreError};
