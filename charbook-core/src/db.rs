//! SQLite-backed adapter.
//!
//! Three normalized tables keyed on the character name. A save replaces the
//! characters row and rewrites both child tables from the in-memory
//! collections inside one transaction, so a crash mid-write never leaves a
//! character half-saved. There is no cross-process locking: two concurrent
//! saves for the same name race with last-write-wins semantics.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::character::{Character, Condition, InventoryItem, Outcome};
use crate::persist::{CharacterStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS characters (
    name TEXT PRIMARY KEY,
    max_health INTEGER,
    current_health INTEGER,
    armour_class INTEGER,
    strength INTEGER,
    dexterity INTEGER,
    constitution INTEGER,
    intelligence INTEGER,
    wisdom INTEGER,
    charisma INTEGER
);

CREATE TABLE IF NOT EXISTS conditions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    character_name TEXT,
    name TEXT,
    value INTEGER,
    attribute TEXT,
    FOREIGN KEY (character_name) REFERENCES characters(name)
);

CREATE TABLE IF NOT EXISTS inventory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    character_name TEXT,
    name TEXT,
    amount INTEGER,
    value REAL,
    weight REAL,
    gold_value REAL,
    type TEXT,
    FOREIGN KEY (character_name) REFERENCES characters(name)
);
"#;

/// Relational backend: all characters in one SQLite database.
pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    /// Create or open the database, ensuring the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// An in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Save a character, replacing any prior record of the same name. The
    /// characters row upsert and the delete-and-reinsert of both child tables
    /// run in one transaction; any failure rolls the whole save back.
    pub fn save(&mut self, character: &Character) -> Outcome<bool> {
        let mut out = Outcome::new(false);
        if character.name.trim().is_empty() {
            out.push("Character name cannot be empty.");
            return out;
        }
        match self.save_tx(character) {
            Ok(()) => {
                debug!(name = %character.name, "character saved to database");
                out.push(format!("Character '{}' saved to database.", character.name));
                out.value = true;
            }
            Err(e) => {
                // The transaction rolled back on drop; nothing was written.
                out.push(format!(
                    "Error saving character '{}': {e}",
                    character.name
                ));
            }
        }
        out
    }

    /// Load a character by name, overwriting every field when a record
    /// exists and mutating nothing when one does not.
    pub fn load(&mut self, character: &mut Character) -> Outcome<bool> {
        let mut out = Outcome::new(false);
        if character.name.trim().is_empty() {
            out.push("Character name cannot be empty.");
            return out;
        }
        match self.load_into(character) {
            Ok(true) => {
                debug!(name = %character.name, "character loaded from database");
                out.push(format!(
                    "Character '{}' loaded from database.",
                    character.name
                ));
                out.value = true;
            }
            Ok(false) => {
                out.push(format!(
                    "Character '{}' not found in database.",
                    character.name
                ));
            }
            Err(e) => {
                out.push(format!(
                    "Error loading character '{}': {e}",
                    character.name
                ));
            }
        }
        out
    }

    fn save_tx(&mut self, character: &Character) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT OR REPLACE INTO characters
                 (name, max_health, current_health, armour_class,
                  strength, dexterity, constitution, intelligence, wisdom, charisma)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                character.name,
                character.max_health,
                character.current_health,
                character.armour_class,
                character.strength,
                character.dexterity,
                character.constitution,
                character.intelligence,
                character.wisdom,
                character.charisma,
            ],
        )?;

        // Child tables are rewritten wholesale, not diffed. Row ids are
        // therefore not stable across saves.
        tx.execute(
            "DELETE FROM conditions WHERE character_name = ?1",
            params![character.name],
        )?;
        tx.execute(
            "DELETE FROM inventory WHERE character_name = ?1",
            params![character.name],
        )?;

        for condition in &character.conditions {
            tx.execute(
                "INSERT INTO conditions (character_name, name, value, attribute)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    character.name,
                    condition.name,
                    condition.value,
                    condition.attribute,
                ],
            )?;
        }
        for item in &character.inventory {
            tx.execute(
                "INSERT INTO inventory
                     (character_name, name, amount, value, weight, gold_value, type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    character.name,
                    item.name,
                    item.amount,
                    item.value,
                    item.weight,
                    item.gold_value,
                    item.kind,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn load_into(&self, character: &mut Character) -> Result<bool, StoreError> {
        type ScalarRow = (i64, i64, i64, i64, i64, i64, i64, i64, i64);
        let row: Option<ScalarRow> = self
            .conn
            .query_row(
                "SELECT max_health, current_health, armour_class,
                        strength, dexterity, constitution, intelligence, wisdom, charisma
                 FROM characters WHERE name = ?1",
                params![character.name],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                        row.get(7)?,
                        row.get(8)?,
                    ))
                },
            )
            .optional()?;

        let Some(scalars) = row else {
            return Ok(false);
        };

        (
            character.max_health,
            character.current_health,
            character.armour_class,
            character.strength,
            character.dexterity,
            character.constitution,
            character.intelligence,
            character.wisdom,
            character.charisma,
        ) = scalars;

        let mut stmt = self.conn.prepare(
            "SELECT name, value, attribute FROM conditions WHERE character_name = ?1 ORDER BY id",
        )?;
        character.conditions = stmt
            .query_map(params![character.name], |row| {
                Ok(Condition {
                    name: row.get(0)?,
                    value: row.get(1)?,
                    attribute: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT name, amount, value, weight, gold_value, type
             FROM inventory WHERE character_name = ?1 ORDER BY id",
        )?;
        character.inventory = stmt
            .query_map(params![character.name], |row| {
                Ok(InventoryItem {
                    name: row.get(0)?,
                    amount: row.get(1)?,
                    value: row.get(2)?,
                    weight: row.get(3)?,
                    gold_value: row.get(4)?,
                    kind: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(true)
    }
}

impl CharacterStore for DbStore {
    fn save(&mut self, character: &Character) -> Outcome<bool> {
        DbStore::save(self, character)
    }

    fn load(&mut self, character: &mut Character) -> Outcome<bool> {
        DbStore::load(self, character)
    }
}
