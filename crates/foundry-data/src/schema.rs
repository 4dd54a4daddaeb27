//! Serde data file structs for game content definitions.
//!
//! These structs define the on-disk format for items, crafts, soldiers,
//! manufacture rules, and campaign settings. They are deserialized from RON,
//! JSON, or TOML data files and then resolved into registry types by the
//! loader. Cross-references are by name.

use foundry_core::registry::BattleType;
use foundry_core::soldier::{Nationality, SoldierTemplate, UnitStats};
use serde::Deserialize;

// ===========================================================================
// Items
// ===========================================================================

/// An item type definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: String,
    #[serde(default)]
    pub sell_cost: i64,
    #[serde(default)]
    pub battle_type: BattleType,
}

// ===========================================================================
// Crafts
// ===========================================================================

/// A craft weapon definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct CraftWeaponData {
    pub name: String,
    #[serde(default)]
    pub ammo_max: u32,
    #[serde(default)]
    pub clip_item: Option<String>,
}

/// A craft definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct CraftData {
    pub name: String,
    pub fuel_max: u32,
    #[serde(default)]
    pub refuel_item: Option<String>,
    pub damage_max: u32,
    #[serde(default)]
    pub fixed_weapons: Vec<String>,
}

// ===========================================================================
// Soldiers
// ===========================================================================

/// A soldier type definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct SoldierData {
    pub name: String,
    #[serde(default)]
    pub min_stats: UnitStats,
    #[serde(default)]
    pub max_stats: UnitStats,
    #[serde(default)]
    pub nationalities: Vec<Nationality>,
}

// ===========================================================================
// Manufacture
// ===========================================================================

/// One weighted reward set.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomOutcomeData {
    pub weight: u32,
    pub items: Vec<(String, u32)>,
}

/// A person delivered per completed unit. `kind` is `STR_SCIENTIST`,
/// `STR_ENGINEER`, or a soldier type name.
#[derive(Debug, Clone, Deserialize)]
pub struct SpawnedPersonData {
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub template: SoldierTemplate,
}

/// A manufacture rule in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ManufactureData {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub cost: i64,
    pub time: u32,
    #[serde(default)]
    pub required_items: Vec<(String, u32)>,
    #[serde(default)]
    pub required_crafts: Vec<(String, u32)>,
    #[serde(default)]
    pub produced_items: Vec<(String, u32)>,
    /// Mutually exclusive with `produced_items`.
    #[serde(default)]
    pub produced_craft: Option<String>,
    #[serde(default)]
    pub random_outputs: Vec<RandomOutcomeData>,
    #[serde(default)]
    pub spawned_person: Option<SpawnedPersonData>,
    #[serde(default)]
    pub points: i32,
}

// ===========================================================================
// Campaign
// ===========================================================================

fn default_coefficient() -> f64 {
    1.0
}

/// Campaign-wide economy settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignData {
    #[serde(default)]
    pub starting_funds: i64,
    /// Multiplier on every item's sell cost.
    #[serde(default = "default_coefficient")]
    pub sell_price_coefficient: f64,
}

impl Default for CampaignData {
    fn default() -> Self {
        Self {
            starting_funds: 0,
            sell_price_coefficient: default_coefficient(),
        }
    }
}

// ===========================================================================
// TOML wrappers
// ===========================================================================

/// Wrapper for a list of items in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlItems {
    pub items: Vec<ItemData>,
}

/// Wrapper for a list of crafts in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlCrafts {
    pub crafts: Vec<CraftData>,
}

/// Wrapper for a list of manufacture rules in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlManufacture {
    pub manufacture: Vec<ManufactureData>,
}

// ===========================================================================
// Tests
// ===========================================================================
