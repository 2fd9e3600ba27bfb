//! QA tests for the dual-backend save/load contract.
//!
//! The same in-memory character must round-trip through both the file
//! backend and the relational backend.

use charbook_core::{Character, CharacterStore, DbStore, FileStore, StorageConfig};
use tempfile::TempDir;

fn elara() -> Character {
    let mut character = Character::new("Elara")
        .with_max_health(120)
        .with_armour_class(15)
        .with_ability_scores(14, 18, 12, 10, 13, 16);
    character.current_health = 110;
    character.add_item("Longbow", 1, 0.0, 2.0, 50.0, "Weapon");
    character.set_condition("Blessed", 1, "Attack Rolls");
    character
}

fn assert_elara_round_trip(store: &mut dyn CharacterStore) {
    let character = elara();
    let saved = store.save(&character);
    assert!(saved.value, "save failed: {:?}", saved.messages);

    let mut loaded = Character::new("Elara");
    let outcome = store.load(&mut loaded);
    assert!(outcome.value, "load failed: {:?}", outcome.messages);

    assert_eq!(loaded.current_health, 110);
    assert_eq!(loaded.max_health, 120);
    assert_eq!(loaded.armour_class, 15);
    assert_eq!(loaded.dexterity, 18);
    assert_eq!(loaded.inventory.len(), 1);
    assert_eq!(loaded.inventory[0].name, "Longbow");
    assert_eq!(loaded.inventory[0].amount, 1);
    assert_eq!(loaded.conditions.len(), 1);
    assert_eq!(loaded.conditions[0].name, "Blessed");
    assert_eq!(loaded.conditions[0].value, 1);
    assert_eq!(loaded.conditions[0].attribute, "Attack Rolls");
}

// =============================================================================
// TEST 1: The same character round-trips through both backends
// =============================================================================

#[test]
fn test_round_trip_file_backend() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let mut store = FileStore::new(temp_dir.path());
    assert_elara_round_trip(&mut store);
}

#[test]
fn test_round_trip_database_backend() {
    let mut store = DbStore::open_in_memory().expect("Failed to open database");
    assert_elara_round_trip(&mut store);
}

// =============================================================================
// TEST 2: Backend selection through configuration
// =============================================================================

#[test]
fn test_storage_config_selects_backend() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let file_config = StorageConfig::File {
        directory: temp_dir.path().join("saves"),
    };
    let mut store = file_config.open().expect("Failed to open file backend");
    assert_elara_round_trip(store.as_mut());

    let db_config = StorageConfig::Database {
        path: temp_dir.path().join("characters.db"),
    };
    let mut store = db_config.open().expect("Failed to open database backend");
    assert_elara_round_trip(store.as_mut());
}

// =============================================================================
// TEST 3: Loading a name with no backing record
// =============================================================================

#[test]
fn test_load_missing_record_leaves_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let mut file_store = FileStore::new(temp_dir.path());
    let mut db_store = DbStore::open_in_memory().expect("Failed to open database");

    for store in [&mut file_store as &mut dyn CharacterStore, &mut db_store] {
        let mut character = Character::new("Nobody");
        let outcome = store.load(&mut character);
        assert!(!outcome.value);
        assert!(!outcome.messages.is_empty());
        assert_eq!(character, Character::new("Nobody"));
    }
}

// =============================================================================
// TEST 4: Mutate-save-load cycle, the editor's request flow
// =============================================================================

#[test]
fn test_edit_cycle_through_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("characters.db");

    // First request: create and save.
    {
        let mut store = DbStore::open(&db_path).expect("Failed to open database");
        assert!(store.save(&elara()).value);
    }

    // Second request: fresh character, load, mutate, save.
    {
        let mut store = DbStore::open(&db_path).expect("Failed to open database");
        let mut character = Character::new("Elara");
        assert!(store.load(&mut character).value);

        character.adjust_health(-30);
        character.add_item("Arrows", 20, 0.0, 1.0, 1.0, "Ammunition");
        assert!(store.save(&character).value);
    }

    // Third request: verify.
    {
        let mut store = DbStore::open(&db_path).expect("Failed to open database");
        let mut character = Character::new("Elara");
        assert!(store.load(&mut character).value);
        assert_eq!(character.current_health, 80);
        assert_eq!(character.inventory.len(), 2);
    }
}

// =============================================================================
// TEST 5: File backend reads documents written by hand
// =============================================================================

#[test]
fn test_file_backend_reads_plain_document() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    std::fs::write(
        temp_dir.path().join("borin_stonebeard.chr"),
        r#"{
            "name": "Borin Stonebeard",
            "max_health": 130,
            "current_health": 130,
            "strength": 12,
            "conditions": [{"name": "Stunned", "value": 1, "attribute": "TestAttribute"}],
            "inventory": [{"name": "Warhammer", "amount": 1, "value": 0.0,
                           "weight": 1.0, "gold_value": 10.0, "type": "TestItemType"}]
        }"#,
    )
    .expect("Failed to write document");

    let mut store = FileStore::new(temp_dir.path());
    let mut character = Character::new("Borin Stonebeard");
    let outcome = store.load(&mut character);
    assert!(outcome.value, "load failed: {:?}", outcome.messages);
    assert_eq!(character.current_health, 130);
    assert_eq!(character.strength, 12);
    assert_eq!(character.conditions[0].name, "Stunned");
    assert_eq!(character.inventory[0].name, "Warhammer");
}
