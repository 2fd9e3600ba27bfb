//! One-shot batch conversion of file-backend documents into the database.
//!
//! Each `.chr` document in the source directory becomes (or replaces) a
//! database record. Per-file failures are counted and reported; they never
//! abort the rest of the batch.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::character::{Character, Outcome};
use crate::db::DbStore;
use crate::persist::PartialDocument;

/// Tally of a migration run. This is the whole output contract: per-file
/// detail lives in the outcome messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub migrated: usize,
    pub failed: usize,
}

/// Convert every `.chr` document under `source` into a database record.
pub fn migrate_directory(source: impl AsRef<Path>, db: &mut DbStore) -> Outcome<MigrationReport> {
    let source = source.as_ref();
    let mut out = Outcome::new(MigrationReport::default());

    if !source.is_dir() {
        out.push(format!(
            "Character directory '{}' not found.",
            source.display()
        ));
        return out;
    }
    let entries = match fs::read_dir(source) {
        Ok(entries) => entries,
        Err(e) => {
            out.push(format!(
                "Error reading directory '{}': {e}",
                source.display()
            ));
            return out;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map(|ext| ext == "chr").unwrap_or(false) {
            match migrate_file(&path, db) {
                Ok(name) => {
                    out.value.migrated += 1;
                    out.push(format!("Migrated '{name}' from '{}'.", path.display()));
                }
                Err(reason) => {
                    out.value.failed += 1;
                    warn!(path = %path.display(), %reason, "migration failed");
                    out.push(format!(
                        "Failed to migrate '{}': {reason}",
                        path.display()
                    ));
                }
            }
        }
    }

    let report = out.value;
    info!(migrated = report.migrated, failed = report.failed, "migration finished");
    out.push(format!(
        "Migration complete. {} character(s) migrated, {} failed.",
        report.migrated, report.failed
    ));
    out
}

fn migrate_file(path: &Path, db: &mut DbStore) -> Result<String, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("could not read file: {e}"))?;
    let document: PartialDocument = serde_json::from_str(&content)
        .map_err(|_| "could not decode JSON; file might be corrupted".to_string())?;

    let name = document
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| name_from_file_stem(path))
        .ok_or_else(|| "could not determine character name".to_string())?;

    let mut character = Character::new(name);
    let has_current_health = document.current_health.is_some();
    document.apply(&mut character);
    // A document without a recorded current health starts at full.
    if !has_current_health {
        character.current_health = character.max_health;
    }

    let saved = db.save(&character);
    if saved.value {
        Ok(character.name)
    } else {
        Err(saved.messages.join("; "))
    }
}

/// Derive a display name from a filename: "zaltar_the_merchant.chr" becomes
/// "Zaltar The Merchant".
fn name_from_file_stem(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let name = stem
        .split('_')
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
        }
        None => String::new(),
    }
}
