//! The character sheet model: stats, health, conditions, and inventory.
//!
//! Every mutating operation returns an [`Outcome`] carrying the messages
//! produced by that single call. Fields are public so a front end can apply
//! bulk form edits directly; the methods here enforce the clamping and merge
//! rules for incremental updates.

use serde::{Deserialize, Deserializer, Serialize};

/// Result of a single model or storage operation: the value plus the
/// human-readable messages produced while computing it.
///
/// Messages belong to the call that produced them; they are never
/// accumulated across calls.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub messages: Vec<String>,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            messages: Vec::new(),
        }
    }

    pub fn with_message(value: T, message: impl Into<String>) -> Self {
        Self {
            value,
            messages: vec![message.into()],
        }
    }

    /// Append a message to this outcome.
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}

// ============================================================================
// Conditions
// ============================================================================

/// A named status modifier.
///
/// A value of 0 is never stored; it is the removal sentinel in
/// [`Character::set_condition`]. A condition whose `attribute` is `"health"`
/// (any casing) carries a recurring health delta applied by
/// [`Character::run_conditions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    pub value: i64,
    /// The stat or roll the condition modifies. May be empty.
    #[serde(default, deserialize_with = "null_to_empty")]
    pub attribute: String,
}

impl Condition {
    /// True if this condition's value should be applied to health each round.
    pub fn affects_health(&self) -> bool {
        self.attribute.eq_ignore_ascii_case("health")
    }
}

// Older save files store a missing attribute as an explicit null.
fn null_to_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Inventory
// ============================================================================

/// A named, quantified possession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub amount: i64,
    pub value: f64,
    pub weight: f64,
    pub gold_value: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

// ============================================================================
// Character
// ============================================================================

/// One character's full sheet.
///
/// All fields are public: the editing front end writes scalars and whole
/// collections directly when applying a submitted form, while incremental
/// play-time changes go through the mutator methods below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub max_health: i64,
    /// Kept within `[0, max_health]` by [`Character::adjust_health`]. A
    /// record loaded with an out-of-range value is not auto-corrected.
    pub current_health: i64,
    pub armour_class: i64,
    pub strength: i64,
    pub dexterity: i64,
    pub constitution: i64,
    pub intelligence: i64,
    pub wisdom: i64,
    pub charisma: i64,
    pub conditions: Vec<Condition>,
    pub inventory: Vec<InventoryItem>,
}

impl Character {
    /// Create a character with default stats: 100 max health (at full),
    /// armour class 10, all ability scores 10.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_health: 100,
            current_health: 100,
            armour_class: 10,
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
            conditions: Vec::new(),
            inventory: Vec::new(),
        }
    }

    /// Set max health, starting at full.
    pub fn with_max_health(mut self, max_health: i64) -> Self {
        self.max_health = max_health;
        self.current_health = max_health;
        self
    }

    pub fn with_armour_class(mut self, armour_class: i64) -> Self {
        self.armour_class = armour_class;
        self
    }

    /// Set the six ability scores in standard order.
    pub fn with_ability_scores(
        mut self,
        strength: i64,
        dexterity: i64,
        constitution: i64,
        intelligence: i64,
        wisdom: i64,
        charisma: i64,
    ) -> Self {
        self.strength = strength;
        self.dexterity = dexterity;
        self.constitution = constitution;
        self.intelligence = intelligence;
        self.wisdom = wisdom;
        self.charisma = charisma;
        self
    }

    // ------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------

    /// Current health, unchanged.
    pub fn health(&self) -> i64 {
        self.current_health
    }

    /// Adjust current health by `adjustment`, clamping to `[0, max_health]`.
    ///
    /// Returns the post-clamp current health. A message is emitted whenever a
    /// clamp occurred, followed by one describing the requested adjustment.
    pub fn adjust_health(&mut self, adjustment: i64) -> Outcome<i64> {
        let mut out = Outcome::new(self.current_health);
        self.current_health = self.current_health.saturating_add(adjustment);
        if self.current_health > self.max_health {
            self.current_health = self.max_health;
            out.push(format!(
                "Health capped at max health: {}",
                self.max_health
            ));
        }
        if self.current_health < 0 {
            self.current_health = 0;
            out.push("Health cannot drop below 0.");
        }
        out.push(format!(
            "Health adjusted by {adjustment}. Current health: {}",
            self.current_health
        ));
        out.value = self.current_health;
        out
    }

    // ------------------------------------------------------------------
    // Conditions
    // ------------------------------------------------------------------

    /// Add, replace, or remove a condition. Name matching is
    /// case-insensitive; the stored name keeps the casing given here.
    ///
    /// A value of 0 removes the condition. Returns whether anything changed.
    pub fn set_condition(&mut self, name: &str, value: i64, attribute: &str) -> Outcome<bool> {
        let existing = self.find_condition(name);
        if value == 0 {
            return match existing {
                Some(index) => {
                    self.conditions.remove(index);
                    Outcome::with_message(true, format!("Condition '{name}' removed."))
                }
                None => Outcome::with_message(false, format!("Condition '{name}' not found.")),
            };
        }

        let condition = Condition {
            name: name.to_string(),
            value,
            attribute: attribute.to_string(),
        };
        match existing {
            Some(index) => {
                self.conditions[index] = condition;
                Outcome::with_message(true, format!("Condition '{name}' updated."))
            }
            None => {
                self.conditions.push(condition);
                Outcome::with_message(true, format!("Condition '{name}' added."))
            }
        }
    }

    /// Apply every health-affecting condition, in sequence order, through
    /// [`Character::adjust_health`].
    ///
    /// Returns the total of the adjustments *requested*, not the post-clamp
    /// deltas. Conditions are applied one at a time; because each application
    /// clamps, the order in the sequence is observable and deliberately
    /// preserved.
    pub fn run_conditions(&mut self) -> Outcome<i64> {
        let mut out = Outcome::new(0);
        let mut total = 0i64;
        let pending: Vec<(String, i64)> = self
            .conditions
            .iter()
            .filter(|c| c.affects_health() && c.value != 0)
            .map(|c| (c.name.clone(), c.value))
            .collect();
        for (name, adjustment) in pending {
            out.push(format!(
                "Applying condition '{name}': adjusting health by {adjustment}"
            ));
            let applied = self.adjust_health(adjustment);
            out.messages.extend(applied.messages);
            total += adjustment;
        }
        out.push(format!(
            "Finished running conditions. Total health adjustment: {total}"
        ));
        out.value = total;
        out
    }

    // ------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------

    /// Add `amount` of an item. If an item with the same name already exists
    /// (case-insensitive), only its amount grows; the stored value, weight,
    /// gold value, and type are left untouched.
    ///
    /// Validation failures mutate nothing and return `false` with a message.
    pub fn add_item(
        &mut self,
        name: &str,
        amount: i64,
        value: f64,
        weight: f64,
        gold_value: f64,
        kind: &str,
    ) -> Outcome<bool> {
        if amount <= 0 {
            return Outcome::with_message(false, "Amount must be a positive integer.");
        }
        if !value.is_finite() || !weight.is_finite() || !gold_value.is_finite() {
            return Outcome::with_message(false, "Value, weight, and gold value must be numbers.");
        }
        if name.trim().is_empty() {
            return Outcome::with_message(false, "Item name cannot be empty.");
        }
        if kind.trim().is_empty() {
            return Outcome::with_message(false, "Item type cannot be empty.");
        }

        match self.find_item(name) {
            Some(index) => {
                self.inventory[index].amount += amount;
                Outcome::with_message(
                    true,
                    format!(
                        "Added {amount} x '{name}'. Total amount: {}",
                        self.inventory[index].amount
                    ),
                )
            }
            None => {
                self.inventory.push(InventoryItem {
                    name: name.to_string(),
                    amount,
                    value,
                    weight,
                    gold_value,
                    kind: kind.to_string(),
                });
                Outcome::with_message(true, format!("Added new item: '{name}' ({amount})"))
            }
        }
    }

    /// Adjust an item's amount by `adjustment` (negative to consume). The
    /// item is removed entirely when its amount reaches 0 or less.
    pub fn adjust_item_amount(&mut self, name: &str, adjustment: i64) -> Outcome<bool> {
        if name.trim().is_empty() {
            return Outcome::with_message(false, "Item name cannot be empty.");
        }
        match self.find_item(name) {
            Some(index) => {
                self.inventory[index].amount =
                    self.inventory[index].amount.saturating_add(adjustment);
                let item_name = self.inventory[index].name.clone();
                if self.inventory[index].amount <= 0 {
                    self.inventory.remove(index);
                    Outcome::with_message(
                        true,
                        format!("Removed '{item_name}' as amount reached 0 or less."),
                    )
                } else {
                    Outcome::with_message(
                        true,
                        format!(
                            "Adjusted amount for '{item_name}' by {adjustment}. New amount: {}",
                            self.inventory[index].amount
                        ),
                    )
                }
            }
            None => Outcome::with_message(false, format!("Item '{name}' not found in inventory.")),
        }
    }

    /// List inventory items, optionally filtered by exact (case-insensitive)
    /// name and/or type. Pure; never mutates.
    pub fn list_inventory(
        &self,
        name: Option<&str>,
        kind: Option<&str>,
    ) -> Outcome<Vec<InventoryItem>> {
        let mut out = Outcome::new(Vec::new());
        let name_filter = name.map(str::trim).filter(|s| !s.is_empty());
        let kind_filter = kind.map(str::trim).filter(|s| !s.is_empty());

        let mut filtered = self.inventory.clone();
        if let Some(n) = name_filter {
            let n_lower = n.to_lowercase();
            filtered.retain(|item| item.name.to_lowercase() == n_lower);
            out.push(format!("Filtered inventory by name: '{n}'"));
        }
        if let Some(k) = kind_filter {
            let k_lower = k.to_lowercase();
            filtered.retain(|item| item.kind.to_lowercase() == k_lower);
            out.push(format!("Filtered inventory by type: '{k}'"));
        }

        if name_filter.is_none() && kind_filter.is_none() {
            out.push("Listing all inventory items.");
        } else if filtered.is_empty() {
            match (name_filter, kind_filter) {
                (Some(n), Some(k)) => {
                    out.push(format!("No items found matching name '{n}' and type '{k}'."))
                }
                (Some(n), None) => out.push(format!("No items found matching name '{n}'.")),
                (None, Some(k)) => out.push(format!("No items found matching type '{k}'.")),
                (None, None) => {}
            }
        }

        out.value = filtered;
        out
    }

    fn find_condition(&self, name: &str) -> Option<usize> {
        let name_lower = name.to_lowercase();
        self.conditions
            .iter()
            .position(|c| c.name.to_lowercase() == name_lower)
    }

    fn find_item(&self, name: &str) -> Option<usize> {
        let name_lower = name.to_lowercase();
        self.inventory
            .iter()
            .position(|i| i.name.to_lowercase() == name_lower)
    }
}
