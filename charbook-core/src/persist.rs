//! Storage interface and the file-backed adapter.
//!
//! A character saves as one JSON document per name; the filename is derived
//! deterministically from the name so a fresh instance can find its record
//! again. Failures never escape as errors: every adapter converts them to a
//! `false` outcome with a message, and the caller decides what to display.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::character::{Character, Condition, InventoryItem, Outcome};
use crate::db::DbStore;

/// Errors from storage internals. These never cross the [`CharacterStore`]
/// boundary; the adapters fold them into outcome messages.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A persistence backend for characters.
///
/// `save` is a full overwrite of the backend record; `load` overwrites the
/// character's fields from the record when one exists. Both report failure as
/// a `false` value plus messages, never as an error.
pub trait CharacterStore {
    fn save(&mut self, character: &Character) -> Outcome<bool>;
    fn load(&mut self, character: &mut Character) -> Outcome<bool>;
}

/// Which backend to use, typically read from an application config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// One JSON document per character under `directory`.
    File { directory: PathBuf },
    /// All characters in a single SQLite database at `path`.
    Database { path: PathBuf },
}

impl StorageConfig {
    /// Open the configured backend.
    pub fn open(&self) -> Result<Box<dyn CharacterStore>, StoreError> {
        match self {
            StorageConfig::File { directory } => Ok(Box::new(FileStore::new(directory.clone()))),
            StorageConfig::Database { path } => Ok(Box::new(DbStore::open(path)?)),
        }
    }
}

/// Filename for a character's save document: lower-cased, spaces replaced
/// with underscores, `.chr` extension.
pub fn save_file_name(name: &str) -> String {
    format!("{}.chr", name.to_lowercase().replace(' ', "_"))
}

// ============================================================================
// Save document
// ============================================================================

/// The document shape written to disk. Borrowed so saving never clones the
/// collections.
#[derive(Serialize)]
struct SaveDocument<'a> {
    name: &'a str,
    max_health: i64,
    current_health: i64,
    armour_class: i64,
    strength: i64,
    dexterity: i64,
    constitution: i64,
    intelligence: i64,
    wisdom: i64,
    charisma: i64,
    conditions: &'a [Condition],
    inventory: &'a [InventoryItem],
}

impl<'a> SaveDocument<'a> {
    fn from_character(character: &'a Character) -> Self {
        Self {
            name: &character.name,
            max_health: character.max_health,
            current_health: character.current_health,
            armour_class: character.armour_class,
            strength: character.strength,
            dexterity: character.dexterity,
            constitution: character.constitution,
            intelligence: character.intelligence,
            wisdom: character.wisdom,
            charisma: character.charisma,
            conditions: &character.conditions,
            inventory: &character.inventory,
        }
    }
}

/// A document read back from disk. Every field is optional: a key absent
/// from the document leaves the corresponding character field at its
/// pre-load value. The aliases accept documents written by the pre-Rust
/// implementation, which prefixed private fields with an underscore.
#[derive(Debug, Default, Deserialize)]
pub struct PartialDocument {
    pub name: Option<String>,
    pub max_health: Option<i64>,
    #[serde(alias = "_current_health")]
    pub current_health: Option<i64>,
    pub armour_class: Option<i64>,
    pub strength: Option<i64>,
    pub dexterity: Option<i64>,
    pub constitution: Option<i64>,
    pub intelligence: Option<i64>,
    pub wisdom: Option<i64>,
    pub charisma: Option<i64>,
    #[serde(alias = "_conditions")]
    pub conditions: Option<Vec<Condition>>,
    #[serde(alias = "_inventory")]
    pub inventory: Option<Vec<InventoryItem>>,
}

impl PartialDocument {
    /// Overwrite every character field the document has a key for.
    pub fn apply(self, character: &mut Character) {
        if let Some(name) = self.name {
            character.name = name;
        }
        if let Some(max_health) = self.max_health {
            character.max_health = max_health;
        }
        if let Some(current_health) = self.current_health {
            character.current_health = current_health;
        }
        if let Some(armour_class) = self.armour_class {
            character.armour_class = armour_class;
        }
        if let Some(strength) = self.strength {
            character.strength = strength;
        }
        if let Some(dexterity) = self.dexterity {
            character.dexterity = dexterity;
        }
        if let Some(constitution) = self.constitution {
            character.constitution = constitution;
        }
        if let Some(intelligence) = self.intelligence {
            character.intelligence = intelligence;
        }
        if let Some(wisdom) = self.wisdom {
            character.wisdom = wisdom;
        }
        if let Some(charisma) = self.charisma {
            character.charisma = charisma;
        }
        if let Some(conditions) = self.conditions {
            character.conditions = conditions;
        }
        if let Some(inventory) = self.inventory {
            character.inventory = inventory;
        }
    }
}

// ============================================================================
// File backend
// ============================================================================

/// File-based backend: one pretty-printed JSON `.chr` document per character.
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Full path of the save document for `name`.
    pub fn character_path(&self, name: &str) -> PathBuf {
        self.directory.join(save_file_name(name))
    }

    fn write_document(&self, character: &Character, path: &Path) -> Result<(), StoreError> {
        let document = SaveDocument::from_character(character);
        let content = serde_json::to_string_pretty(&document)?;
        fs::write(path, content)?;
        Ok(())
    }
}

impl CharacterStore for FileStore {
    fn save(&mut self, character: &Character) -> Outcome<bool> {
        let mut out = Outcome::new(false);
        if character.name.trim().is_empty() {
            out.push("Character name cannot be empty.");
            return out;
        }
        if let Err(e) = fs::create_dir_all(&self.directory) {
            out.push(format!(
                "Error creating directory '{}': {e}",
                self.directory.display()
            ));
            return out;
        }
        out.push(format!(
            "Ensured directory '{}' exists.",
            self.directory.display()
        ));

        let path = self.character_path(&character.name);
        match self.write_document(character, &path) {
            Ok(()) => {
                debug!(name = %character.name, path = %path.display(), "character saved");
                out.push(format!(
                    "Character '{}' saved successfully to '{}'",
                    character.name,
                    path.display()
                ));
                out.value = true;
            }
            Err(e) => {
                out.push(format!(
                    "Error saving character '{}': {e}",
                    character.name
                ));
            }
        }
        out
    }

    fn load(&mut self, character: &mut Character) -> Outcome<bool> {
        let mut out = Outcome::new(false);
        if character.name.trim().is_empty() {
            out.push("Character name cannot be empty.");
            return out;
        }
        let path = self.character_path(&character.name);
        if !path.exists() {
            out.push(format!(
                "Save file not found for character '{}' at '{}'",
                character.name,
                path.display()
            ));
            return out;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                out.push(format!("Error reading file '{}': {e}", path.display()));
                return out;
            }
        };
        let document: PartialDocument = match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(_) => {
                out.push(format!(
                    "Error decoding JSON from file '{}'. File might be corrupted.",
                    path.display()
                ));
                return out;
            }
        };
        document.apply(character);
        debug!(name = %character.name, path = %path.display(), "character loaded");
        out.push(format!(
            "Character '{}' loaded successfully from '{}'",
            character.name,
            path.display()
        ));
        out.value = true;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_file_name() {
        assert_eq!(save_file_name("Zaltar the Merchant"), "zaltar_the_merchant.chr");
        assert_eq!(save_file_name("Elara"), "elara.chr");
    }

    #[test]
    fn test_save_creates_directory_and_document() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let directory = temp_dir.path().join("saves");
        let mut store = FileStore::new(&directory);

        let mut character = Character::new("Zaltar the Merchant").with_max_health(70);
        character.add_item("Healing Potion", 3, 50.0, 0.5, 10.0, "Consumable");

        let out = store.save(&character);
        assert!(out.value, "save failed: {:?}", out.messages);
        assert!(directory.join("zaltar_the_merchant.chr").exists());
    }

    #[test]
    fn test_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = FileStore::new(temp_dir.path());

        let mut character = Character::new("Elara")
            .with_max_health(120)
            .with_armour_class(15)
            .with_ability_scores(14, 18, 12, 10, 13, 16);
        character.current_health = 110;
        character.add_item("Longbow", 1, 0.0, 2.0, 50.0, "Weapon");
        character.set_condition("Blessed", 1, "Attack Rolls");

        assert!(store.save(&character).value);

        let mut loaded = Character::new("Elara");
        let out = store.load(&mut loaded);
        assert!(out.value, "load failed: {:?}", out.messages);
        assert_eq!(loaded, character);
    }

    #[test]
    fn test_load_missing_file_leaves_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = FileStore::new(temp_dir.path());

        let mut character = Character::new("Nobody");
        let out = store.load(&mut character);
        assert!(!out.value);
        assert!(out.messages[0].contains("Save file not found"));
        assert_eq!(character, Character::new("Nobody"));
    }

    #[test]
    fn test_load_corrupted_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = FileStore::new(temp_dir.path());
        fs::write(store.character_path("Broken"), "not json {").unwrap();

        let mut character = Character::new("Broken");
        let out = store.load(&mut character);
        assert!(!out.value);
        assert!(out.messages[0].contains("might be corrupted"));
        assert_eq!(character, Character::new("Broken"));
    }

    #[test]
    fn test_load_missing_keys_keep_preload_values() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = FileStore::new(temp_dir.path());
        fs::write(
            store.character_path("Grom"),
            r#"{"name": "Grom", "max_health": 150}"#,
        )
        .unwrap();

        let mut character = Character::new("Grom");
        character.armour_class = 17;
        character.current_health = 42;
        let out = store.load(&mut character);
        assert!(out.value);
        assert_eq!(character.max_health, 150);
        // Keys absent from the document stay at their pre-load values.
        assert_eq!(character.armour_class, 17);
        assert_eq!(character.current_health, 42);
    }

    #[test]
    fn test_load_legacy_underscore_keys() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = FileStore::new(temp_dir.path());
        fs::write(
            store.character_path("Old Timer"),
            r#"{
                "name": "Old Timer",
                "max_health": 80,
                "_current_health": 55,
                "_conditions": [{"name": "Bleeding", "value": -1, "attribute": "health"}],
                "_inventory": [{"name": "Rope", "amount": 1, "value": 10.0,
                                "weight": 5.0, "gold_value": 2.0, "type": "Utility"}]
            }"#,
        )
        .unwrap();

        let mut character = Character::new("Old Timer");
        let out = store.load(&mut character);
        assert!(out.value, "load failed: {:?}", out.messages);
        assert_eq!(character.current_health, 55);
        assert_eq!(character.conditions.len(), 1);
        assert_eq!(character.inventory.len(), 1);
        assert_eq!(character.inventory[0].kind, "Utility");
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = FileStore::new(temp_dir.path());

        let character = Character::new("   ");
        let out = store.save(&character);
        assert!(!out.value);
        assert!(out.messages[0].contains("name cannot be empty"));
    }

    #[test]
    fn test_save_is_a_full_overwrite() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = FileStore::new(temp_dir.path());

        let mut character = Character::new("Grom");
        character.add_item("Greataxe", 1, 0.0, 7.0, 20.0, "Weapon");
        store.save(&character);

        character.inventory.clear();
        character.add_item("Healing Potion", 2, 0.0, 0.5, 50.0, "Potion");
        store.save(&character);

        let mut loaded = Character::new("Grom");
        assert!(store.load(&mut loaded).value);
        assert_eq!(loaded.inventory.len(), 1);
        assert_eq!(loaded.inventory[0].name, "Healing Potion");
    }
}
