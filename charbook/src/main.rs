//! Character sheet storage command line tools.
//!
//! `charbook migrate` converts a directory of `.chr` save documents into the
//! SQLite database; `charbook show` prints a character sheet from either
//! backend.

use std::path::PathBuf;

use anyhow::Context;
use charbook_core::{migrate_directory, Character, DbStore, StorageConfig};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "charbook", about = "Character sheet storage tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert every .chr document in a directory into the database.
    Migrate {
        /// Directory containing .chr save documents.
        #[arg(long, default_value = "characters")]
        source: PathBuf,

        /// SQLite database file to write into.
        #[arg(long, default_value = "characters.db")]
        database: PathBuf,
    },
    /// Print a character sheet.
    Show {
        /// Character name, as stored.
        name: String,

        /// Load from a directory of .chr documents (the default backend).
        #[arg(long, conflicts_with = "database")]
        directory: Option<PathBuf>,

        /// Load from a SQLite database instead.
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Migrate { source, database } => {
            let mut db = DbStore::open(&database)
                .with_context(|| format!("could not open database '{}'", database.display()))?;
            let outcome = migrate_directory(&source, &mut db);
            for message in &outcome.messages {
                println!("{message}");
            }
        }
        Command::Show {
            name,
            directory,
            database,
        } => {
            let config = match (directory, database) {
                (Some(directory), _) => StorageConfig::File { directory },
                (None, Some(path)) => StorageConfig::Database { path },
                (None, None) => StorageConfig::File {
                    directory: PathBuf::from("characters"),
                },
            };
            let mut store = config.open().context("could not open storage backend")?;

            let mut character = Character::new(name);
            let loaded = store.load(&mut character);
            if !loaded.value {
                for message in &loaded.messages {
                    eprintln!("{message}");
                }
                std::process::exit(1);
            }
            print_sheet(&character);
        }
    }
    Ok(())
}

fn print_sheet(character: &Character) {
    println!("{}", character.name);
    println!(
        "HP: {}/{}  AC: {}",
        character.current_health, character.max_health, character.armour_class
    );
    println!(
        "STR: {}  DEX: {}  CON: {}  INT: {}  WIS: {}  CHA: {}",
        character.strength,
        character.dexterity,
        character.constitution,
        character.intelligence,
        character.wisdom,
        character.charisma
    );

    if !character.conditions.is_empty() {
        println!("\nConditions:");
        for condition in &character.conditions {
            if condition.attribute.is_empty() {
                println!("  {} ({:+})", condition.name, condition.value);
            } else {
                println!(
                    "  {} ({:+} {})",
                    condition.name, condition.value, condition.attribute
                );
            }
        }
    }

    if !character.inventory.is_empty() {
        println!("\nInventory:");
        for item in &character.inventory {
            println!(
                "  {} x{}  [{}]  {:.1} lb, {:.1} gp",
                item.name, item.amount, item.kind, item.weight, item.gold_value
            );
        }
    }
}
