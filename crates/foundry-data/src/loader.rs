//! Resolution pipeline: reads data files, resolves cross-references, builds registry.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus [`load_game_data`], which turns a content
//! directory into a [`Registry`], a [`CampaignConfig`], and [`Translations`].

use crate::schema::*;
use foundry_core::campaign::CampaignConfig;
use foundry_core::craft::{CraftRule, CraftWeaponRule};
use foundry_core::fixed::f64_to_fixed64;
use foundry_core::id::*;
use foundry_core::item::ItemQuantity;
use foundry_core::language::Translations;
use foundry_core::manufacture::*;
use foundry_core::registry::{ItemRule, Registry, RegistryBuilder, RegistryError};
use foundry_core::soldier::SoldierRule;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// A manufacture rule produces both items and a craft.
    #[error("manufacture '{name}' in {file} produces both items and a craft")]
    ConflictingOutputs { file: PathBuf, name: String },

    /// The resolved content failed registry validation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table. For RON and JSON, deserializes
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }
    let content = std::fs::read_to_string(path)?;
    let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .get(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
        .clone();
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Check whether a name already exists in a map, returning a `DuplicateName`
/// error if so.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

fn resolve_quantities(
    map: &HashMap<String, ItemTypeId>,
    entries: &[(String, u32)],
    file: &Path,
) -> Result<Vec<ItemQuantity>, DataLoadError> {
    entries
        .iter()
        .map(|(name, qty)| Ok(ItemQuantity::new(*resolve_name(map, name, file, "item")?, *qty)))
        .collect()
}

// ===========================================================================
// Game data pipeline
// ===========================================================================

/// Everything loaded from a content directory.
#[derive(Debug)]
pub struct GameData {
    pub registry: Registry,
    pub campaign: CampaignConfig,
    pub translations: Translations,
}

/// Person kinds that are not soldier types.
const SCIENTIST: &str = "STR_SCIENTIST";
const ENGINEER: &str = "STR_ENGINEER";

/// Load a content directory.
///
/// `items` and `manufacture` are required. `craft_weapons`, `crafts`,
/// `soldiers`, `campaign`, and `strings` are optional. Each may be RON, JSON,
/// or TOML, but only one format per file.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let mut builder = RegistryBuilder::new();

    // Items.
    let items_path = require_data_file(dir, "items")?;
    let mut items: HashMap<String, ItemTypeId> = HashMap::new();
    for data in deserialize_list::<ItemData>(&items_path, "items")? {
        check_duplicate(&items, &data.name, &items_path)?;
        let id = builder.register_item(ItemRule {
            name: data.name.clone(),
            sell_cost: data.sell_cost,
            battle_type: data.battle_type,
        });
        items.insert(data.name, id);
    }

    // Craft weapons.
    let mut weapons: HashMap<String, CraftWeaponTypeId> = HashMap::new();
    if let Some(path) = find_data_file(dir, "craft_weapons")? {
        for data in deserialize_list::<CraftWeaponData>(&path, "craft_weapons")? {
            check_duplicate(&weapons, &data.name, &path)?;
            let clip_item = data
                .clip_item
                .as_deref()
                .map(|name| resolve_name(&items, name, &path, "item").copied())
                .transpose()?;
            let id = builder.register_craft_weapon(CraftWeaponRule {
                name: data.name.clone(),
                ammo_max: data.ammo_max,
                clip_item,
            });
            weapons.insert(data.name, id);
        }
    }

    // Crafts.
    let mut crafts: HashMap<String, CraftTypeId> = HashMap::new();
    if let Some(path) = find_data_file(dir, "crafts")? {
        for data in deserialize_list::<CraftData>(&path, "crafts")? {
            check_duplicate(&crafts, &data.name, &path)?;
            let refuel_item = data
                .refuel_item
                .as_deref()
                .map(|name| resolve_name(&items, name, &path, "item").copied())
                .transpose()?;
            let fixed_weapons = data
                .fixed_weapons
                .iter()
                .map(|name| resolve_name(&weapons, name, &path, "craft weapon").copied())
                .collect::<Result<Vec<_>, _>>()?;
            let id = builder.register_craft(CraftRule {
                name: data.name.clone(),
                fuel_max: data.fuel_max,
                refuel_item,
                damage_max: data.damage_max,
                fixed_weapons,
            });
            crafts.insert(data.name, id);
        }
    }

    // Soldiers.
    let mut soldiers: HashMap<String, SoldierTypeId> = HashMap::new();
    if let Some(path) = find_data_file(dir, "soldiers")? {
        for data in deserialize_list::<SoldierData>(&path, "soldiers")? {
            check_duplicate(&soldiers, &data.name, &path)?;
            let id = builder.register_soldier(SoldierRule {
                name: data.name.clone(),
                min_stats: data.min_stats,
                max_stats: data.max_stats,
                nationalities: data.nationalities,
            });
            soldiers.insert(data.name, id);
        }
    }

    // Manufacture.
    let manufacture_path = require_data_file(dir, "manufacture")?;
    let path = manufacture_path.as_path();
    let mut rules: HashMap<String, ManufactureId> = HashMap::new();
    for data in deserialize_list::<ManufactureData>(path, "manufacture")? {
        check_duplicate(&rules, &data.name, path)?;

        let output = match &data.produced_craft {
            Some(_) if !data.produced_items.is_empty() => {
                return Err(DataLoadError::ConflictingOutputs {
                    file: path.to_path_buf(),
                    name: data.name,
                });
            }
            Some(name) => ProductionOutput::Craft(*resolve_name(&crafts, name, path, "craft")?),
            None => ProductionOutput::Items(resolve_quantities(&items, &data.produced_items, path)?),
        };
        let required_crafts = data
            .required_crafts
            .iter()
            .map(|(name, quantity)| {
                Ok(CraftQuantity {
                    craft_type: *resolve_name(&crafts, name, path, "craft")?,
                    quantity: *quantity,
                })
            })
            .collect::<Result<Vec<_>, DataLoadError>>()?;
        let random_outputs = data
            .random_outputs
            .iter()
            .map(|o| {
                Ok(RandomOutcome {
                    weight: o.weight,
                    items: resolve_quantities(&items, &o.items, path)?,
                })
            })
            .collect::<Result<Vec<_>, DataLoadError>>()?;
        let spawned_person = data
            .spawned_person
            .map(|p| {
                let kind = match p.kind.as_str() {
                    SCIENTIST => PersonKind::Scientist,
                    ENGINEER => PersonKind::Engineer,
                    soldier => PersonKind::Soldier(*resolve_name(&soldiers, soldier, path, "soldier")?),
                };
                Ok::<_, DataLoadError>(SpawnedPerson {
                    kind,
                    name: p.name,
                    template: p.template,
                })
            })
            .transpose()?;

        let id = builder.register_manufacture(ManufactureRule {
            name: data.name.clone(),
            category: data.category,
            cost: data.cost,
            time: data.time,
            required_items: resolve_quantities(&items, &data.required_items, path)?,
            required_crafts,
            output,
            random_outputs,
            spawned_person,
            points: data.points,
        });
        rules.insert(data.name, id);
    }

    let registry = builder.build()?;

    // Campaign settings.
    let campaign_data = match find_data_file(dir, "campaign")? {
        Some(path) => deserialize_file::<CampaignData>(&path)?,
        None => CampaignData::default(),
    };
    let campaign = CampaignConfig {
        starting_funds: campaign_data.starting_funds,
        sell_price_coefficient: f64_to_fixed64(campaign_data.sell_price_coefficient),
    };

    // Localized strings.
    let translations = match find_data_file(dir, "strings")? {
        Some(path) => deserialize_file::<BTreeMap<String, String>>(&path)?
            .into_iter()
            .collect(),
        None => Translations::new(),
    };

    log::info!(
        "loaded {} items, {} crafts, {} manufacture rules from {}",
        registry.item_count(),
        registry.craft_count(),
        registry.manufacture_count(),
        dir.display()
    );

    Ok(GameData {
        registry,
        campaign,
        translations,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
