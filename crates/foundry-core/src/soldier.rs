//! Soldiers recruited through manufacture (cloning vats, training programs).
//!
//! A spawned soldier gets a nationality, rolled attributes between the
//! soldier type's minimum and maximum, template overrides, and a name.

use crate::id::SoldierTypeId;
use crate::rng::{RandomSource, pick_weighted};
use serde::{Deserialize, Serialize};

/// Primary attributes of a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub time_units: i32,
    pub stamina: i32,
    pub health: i32,
    pub bravery: i32,
    pub reactions: i32,
    pub firing: i32,
    pub throwing: i32,
    pub strength: i32,
    pub melee: i32,
}

impl UnitStats {
    /// Roll every attribute uniformly between `min` and `max`.
    pub fn roll(min: &UnitStats, max: &UnitStats, rng: &mut dyn RandomSource) -> UnitStats {
        let mut roll = |lo: i32, hi: i32| rng.generate(lo as i64, hi as i64) as i32;
        UnitStats {
            time_units: roll(min.time_units, max.time_units),
            stamina: roll(min.stamina, max.stamina),
            health: roll(min.health, max.health),
            bravery: roll(min.bravery, max.bravery),
            reactions: roll(min.reactions, max.reactions),
            firing: roll(min.firing, max.firing),
            throwing: roll(min.throwing, max.throwing),
            strength: roll(min.strength, max.strength),
            melee: roll(min.melee, max.melee),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoldierRank {
    #[default]
    Rookie,
    Squaddie,
    Sergeant,
    Captain,
    Colonel,
    Commander,
}

/// A nationality a soldier type can be recruited with, plus its name pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nationality {
    pub name: String,
    /// Relative recruitment weight. Zero-weight nationalities are never picked.
    pub weight: u32,
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
}

/// A soldier type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoldierRule {
    pub name: String,
    pub min_stats: UnitStats,
    pub max_stats: UnitStats,
    pub nationalities: Vec<Nationality>,
}

/// Overrides applied to a freshly generated soldier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldierTemplate {
    #[serde(default)]
    pub rank: Option<SoldierRank>,
    #[serde(default)]
    pub stats: Option<UnitStats>,
}

/// A generated soldier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Soldier {
    pub id: u32,
    pub soldier_type: SoldierTypeId,
    pub name: String,
    /// Index into the soldier type's nationality list.
    pub nationality: usize,
    pub rank: SoldierRank,
    pub stats: UnitStats,
}

impl Soldier {
    /// Generate a rookie with rolled attributes. The name is left empty;
    /// callers assign one with [`Soldier::gen_name`] or [`Soldier::set_name`].
    pub fn generate(
        id: u32,
        soldier_type: SoldierTypeId,
        rule: &SoldierRule,
        nationality: usize,
        rng: &mut dyn RandomSource,
    ) -> Self {
        Self {
            id,
            soldier_type,
            name: String::new(),
            nationality,
            rank: SoldierRank::Rookie,
            stats: UnitStats::roll(&rule.min_stats, &rule.max_stats, rng),
        }
    }

    pub fn apply_template(&mut self, template: &SoldierTemplate) {
        if let Some(rank) = template.rank {
            self.rank = rank;
        }
        if let Some(stats) = template.stats {
            self.stats = stats;
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Build a name from the nationality's pools. Falls back to a serial
    /// name when the pools are empty or a draw lands outside them.
    pub fn gen_name(&mut self, rule: &SoldierRule, rng: &mut dyn RandomSource) {
        let drawn = rule.nationalities.get(self.nationality).and_then(|n| {
            let first = pick_name(&n.first_names, rng)?;
            let last = pick_name(&n.last_names, rng)?;
            Some(format!("{first} {last}"))
        });
        self.name = drawn.unwrap_or_else(|| format!("{} {}", rule.name, self.id));
    }
}

fn pick_name<'a>(pool: &'a [String], rng: &mut dyn RandomSource) -> Option<&'a str> {
    if pool.is_empty() {
        return None;
    }
    let index = usize::try_from(rng.generate(0, pool.len() as i64 - 1)).ok()?;
    pool.get(index).map(String::as_str)
}

impl SoldierRule {
    /// Pick a nationality index by weight. Returns 0 when the soldier type
    /// has no weighted nationalities.
    pub fn select_nationality(&self, rng: &mut dyn RandomSource) -> usize {
        let weights: Vec<u32> = self.nationalities.iter().map(|n| n.weight).collect();
        pick_weighted(rng, &weights).unwrap_or(0)
    }
}
