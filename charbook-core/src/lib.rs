//! Character sheet persistence core.
//!
//! This crate provides:
//! - A character model with bounded health adjustment, condition upserts,
//!   and inventory merge/removal rules
//! - Two interchangeable persistence backends: one JSON document per
//!   character, or a normalized SQLite database
//! - A one-shot migration from the file backend into the database
//!
//! Mutations and storage calls report through a per-call message channel
//! ([`Outcome`]) instead of raising errors; the surrounding application
//! decides what to display or log.
//!
//! # Quick Start
//!
//! ```no_run
//! use charbook_core::{Character, CharacterStore, FileStore};
//!
//! let mut character = Character::new("Elara").with_max_health(120);
//! character.add_item("Longbow", 1, 0.0, 2.0, 50.0, "Weapon");
//!
//! let mut store = FileStore::new("characters");
//! let saved = store.save(&character);
//! for message in &saved.messages {
//!     println!("{message}");
//! }
//! ```

pub mod character;
pub mod db;
pub mod migrate;
pub mod persist;

// Primary public API
pub use character::{Character, Condition, InventoryItem, Outcome};
pub use db::DbStore;
pub use migrate::{migrate_directory, MigrationReport};
pub use persist::{CharacterStore, FileStore, StorageConfig, StoreError};
