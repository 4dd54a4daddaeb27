//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available everywhere a registry and a base are needed without loading
//! content files (via the `test-utils` feature).

use crate::base::{Base, BaseLedger, ProductionReport};
use crate::campaign::{Campaign, CampaignConfig};
use crate::craft::{CraftRule, CraftWeaponRule};
use crate::id::*;
use crate::item::ItemQuantity;
use crate::language::Translations;
use crate::manufacture::*;
use crate::production::{ProductionContext, ProductionProgress};
use crate::registry::{BattleType, ItemRule, Registry, RegistryBuilder};
use crate::rng::{RandomSource, SimRng};
use crate::soldier::{Nationality, SoldierRank, SoldierRule, SoldierTemplate, UnitStats};
use std::collections::VecDeque;
use std::sync::Arc;

// ===========================================================================
// Scripted randomness
// ===========================================================================

/// A [`RandomSource`] that replays queued values, clamped into the requested
/// range. Returns the range minimum once the queue runs dry.
#[derive(Debug, Default)]
pub struct ScriptedRng {
    values: VecDeque<i64>,
    calls: usize,
    last_range: Option<(i64, i64)>,
}

impl ScriptedRng {
    pub fn new(values: Vec<i64>) -> Self {
        Self {
            values: values.into(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn last_range(&self) -> Option<(i64, i64)> {
        self.last_range
    }
}

impl RandomSource for ScriptedRng {
    fn generate(&mut self, min: i64, max: i64) -> i64 {
        self.calls += 1;
        self.last_range = Some((min, max));
        if max <= min {
            return min;
        }
        self.values.pop_front().map_or(min, |v| v.clamp(min, max))
    }
}

// ===========================================================================
// Sample content
// ===========================================================================

fn item_rule(name: &str, sell_cost: i64, battle_type: BattleType) -> ItemRule {
    ItemRule {
        name: name.to_string(),
        sell_cost,
        battle_type,
    }
}

fn stats(v: i32) -> UnitStats {
    UnitStats {
        time_units: v,
        stamina: v,
        health: v,
        bravery: v,
        reactions: v,
        firing: v,
        throwing: v,
        strength: v,
        melee: v,
    }
}

/// A small ruleset covering every kind of manufacture: plain items, items
/// with materials, crafts, craft refits, random rewards, and spawned people.
pub fn sample_registry() -> Registry {
    let mut b = RegistryBuilder::new();

    let alloys = b.register_item(item_rule("STR_ALIEN_ALLOYS", 6500, BattleType::None));
    let armor = b.register_item(item_rule("STR_PERSONAL_ARMOR", 26000, BattleType::Armor));
    let rifle = b.register_item(item_rule("STR_LASER_RIFLE", 36900, BattleType::Firearm));
    let elerium = b.register_item(item_rule("STR_ELERIUM_115", 5000, BattleType::None));
    let missiles = b.register_item(item_rule("STR_STINGRAY_MISSILES", 3000, BattleType::None));
    let medikit = b.register_item(item_rule("STR_MEDI_KIT", 1000, BattleType::Medikit));

    let stingray = b.register_craft_weapon(CraftWeaponRule {
        name: "STR_STINGRAY".to_string(),
        ammo_max: 6,
        clip_item: Some(missiles),
    });
    let interceptor = b.register_craft(CraftRule {
        name: "STR_INTERCEPTOR".to_string(),
        fuel_max: 1000,
        refuel_item: None,
        damage_max: 200,
        fixed_weapons: vec![stingray],
    });
    let skyranger = b.register_craft(CraftRule {
        name: "STR_SKYRANGER".to_string(),
        fuel_max: 1500,
        refuel_item: Some(elerium),
        damage_max: 150,
        fixed_weapons: Vec::new(),
    });

    let soldier = b.register_soldier(SoldierRule {
        name: "STR_SOLDIER".to_string(),
        min_stats: stats(40),
        max_stats: stats(60),
        nationalities: vec![Nationality {
            name: "STR_JAPAN".to_string(),
            weight: 1,
            first_names: vec!["Haruki".to_string()],
            last_names: vec!["Sato".to_string()],
        }],
    });

    b.register_manufacture(ManufactureRule {
        name: "STR_LASER_RIFLE".to_string(),
        category: "STR_WEAPON".to_string(),
        cost: 8000,
        time: 300,
        output: ProductionOutput::Items(vec![ItemQuantity::new(rifle, 1)]),
        ..Default::default()
    });
    b.register_manufacture(ManufactureRule {
        name: "STR_PERSONAL_ARMOR".to_string(),
        category: "STR_ARMOR".to_string(),
        cost: 22000,
        time: 800,
        required_items: vec![ItemQuantity::new(alloys, 4)],
        output: ProductionOutput::Items(vec![ItemQuantity::new(armor, 1)]),
        ..Default::default()
    });
    b.register_manufacture(ManufactureRule {
        name: "STR_INTERCEPTOR".to_string(),
        category: "STR_CRAFT".to_string(),
        cost: 50000,
        time: 500,
        output: ProductionOutput::Craft(interceptor),
        ..Default::default()
    });
    b.register_manufacture(ManufactureRule {
        name: "STR_SKYRANGER_REFIT".to_string(),
        category: "STR_CRAFT".to_string(),
        cost: 5000,
        time: 100,
        required_crafts: vec![CraftQuantity {
            craft_type: skyranger,
            quantity: 1,
        }],
        output: ProductionOutput::Items(vec![ItemQuantity::new(alloys, 10)]),
        points: 5,
        ..Default::default()
    });
    b.register_manufacture(ManufactureRule {
        name: "STR_SALVAGE_ANALYSIS".to_string(),
        category: "STR_SALVAGE".to_string(),
        cost: 1000,
        time: 10,
        random_outputs: vec![
            RandomOutcome {
                weight: 3,
                items: vec![ItemQuantity::new(elerium, 2)],
            },
            RandomOutcome {
                weight: 1,
                items: vec![ItemQuantity::new(alloys, 1), ItemQuantity::new(medikit, 1)],
            },
        ],
        ..Default::default()
    });
    b.register_manufacture(ManufactureRule {
        name: "STR_CLONE_SOLDIER".to_string(),
        category: "STR_PERSONNEL".to_string(),
        cost: 20000,
        time: 200,
        spawned_person: Some(SpawnedPerson {
            kind: PersonKind::Soldier(soldier),
            name: None,
            template: SoldierTemplate {
                rank: Some(SoldierRank::Squaddie),
                stats: None,
            },
        }),
        ..Default::default()
    });
    b.register_manufacture(ManufactureRule {
        name: "STR_TRAIN_ENGINEER".to_string(),
        category: "STR_PERSONNEL".to_string(),
        cost: 5000,
        time: 50,
        spawned_person: Some(SpawnedPerson {
            kind: PersonKind::Engineer,
            name: None,
            template: SoldierTemplate::default(),
        }),
        ..Default::default()
    });

    b.build().expect("sample registry is valid")
}

pub fn item(registry: &Registry, name: &str) -> ItemTypeId {
    registry
        .item_id(name)
        .unwrap_or_else(|| panic!("no item {name}"))
}

pub fn interceptor(registry: &Registry) -> CraftTypeId {
    registry.craft_id("STR_INTERCEPTOR").expect("interceptor")
}

pub fn skyranger(registry: &Registry) -> CraftTypeId {
    registry.craft_id("STR_SKYRANGER").expect("skyranger")
}

pub fn manufacture(registry: &Registry, name: &str) -> Arc<ManufactureRule> {
    registry
        .manufacture_by_name(name)
        .cloned()
        .unwrap_or_else(|| panic!("no manufacture rule {name}"))
}

/// A rule with no materials and no output: only time and cost.
pub fn simple_rule(name: &str, time: u32, cost: i64) -> Arc<ManufactureRule> {
    Arc::new(ManufactureRule {
        name: name.to_string(),
        cost,
        time,
        ..Default::default()
    })
}

// ===========================================================================
// Fixture
// ===========================================================================

/// A base with plenty of engineers and housing, a campaign, and the
/// collaborators a production step needs.
pub struct Fixture<'r> {
    pub registry: &'r Registry,
    pub base: Base,
    pub campaign: Campaign,
    pub rng: Box<dyn RandomSource>,
    pub lang: Translations,
}

impl<'r> Fixture<'r> {
    pub const ENGINEERS: u32 = 10_000;
    pub const LIVING_QUARTERS: u32 = 20_000;

    pub fn new(registry: &'r Registry, funds: i64) -> Self {
        let mut ledger = BaseLedger::new(Self::LIVING_QUARTERS);
        ledger.engineers = Self::ENGINEERS;
        Self {
            registry,
            base: Base::new("Test Base", ledger),
            campaign: Campaign::new(&CampaignConfig {
                starting_funds: funds,
                ..Default::default()
            }),
            rng: Box::new(SimRng::new(42)),
            lang: Translations::new(),
        }
    }

    pub fn with_rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Step one order in place.
    pub fn step(&mut self, index: usize) -> ProductionProgress {
        let mut ctx = ProductionContext {
            registry: self.registry,
            campaign: &mut self.campaign,
            rng: self.rng.as_mut(),
            lang: &self.lang,
        };
        self.base
            .step_production(index, &mut ctx)
            .unwrap_or_else(|| panic!("no production at {index}"))
    }

    /// One hour across every order of the base.
    pub fn step_all(&mut self) -> Vec<ProductionReport> {
        let mut ctx = ProductionContext {
            registry: self.registry,
            campaign: &mut self.campaign,
            rng: self.rng.as_mut(),
            lang: &self.lang,
        };
        self.base.step_productions(&mut ctx)
    }
}
