//! Craft instances produced by (or consumed by) manufacture.

use crate::id::{CraftTypeId, CraftWeaponTypeId, ItemTypeId};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};

/// A craft weapon type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftWeaponRule {
    pub name: String,
    pub ammo_max: u32,
    /// Item consumed from stores to rearm. `None` for weapons that never
    /// need ammunition.
    pub clip_item: Option<ItemTypeId>,
}

/// A craft type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftRule {
    pub name: String,
    pub fuel_max: u32,
    /// Item consumed from stores to refuel. `None` refuels for free.
    pub refuel_item: Option<ItemTypeId>,
    pub damage_max: u32,
    /// Weapons fitted to every new craft of this type.
    pub fixed_weapons: Vec<CraftWeaponTypeId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraftStatus {
    #[default]
    Ready,
    Refuelling,
    Rearming,
    Repairs,
    /// Away on a mission; not available for production.
    Out,
}

/// A weapon mounted on a craft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftWeapon {
    pub rules: CraftWeaponTypeId,
    pub ammo: u32,
    pub rearming: bool,
}

/// A craft stationed at a base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Craft {
    pub rules: CraftTypeId,
    /// Serial number among crafts of the same type.
    pub id: u32,
    pub fuel: u32,
    pub damage: u32,
    pub status: CraftStatus,
    pub weapons: Vec<CraftWeapon>,
}

impl Craft {
    /// A brand-new craft: empty tank, no damage, no weapons.
    pub fn new(rules: CraftTypeId, id: u32) -> Self {
        Self {
            rules,
            id,
            fuel: 0,
            damage: 0,
            status: CraftStatus::Ready,
            weapons: Vec::new(),
        }
    }

    /// Mount the craft type's fixed weapons, unloaded.
    pub fn init_fixed_weapons(&mut self, registry: &Registry) {
        let Some(rule) = registry.craft(self.rules) else {
            return;
        };
        self.weapons = rule
            .fixed_weapons
            .iter()
            .map(|&w| CraftWeapon {
                rules: w,
                ammo: 0,
                rearming: false,
            })
            .collect();
    }

    /// Recompute the status from damage, ammunition, and fuel.
    pub fn checkup(&mut self, registry: &Registry) {
        if self.status == CraftStatus::Out {
            return;
        }
        let Some(rule) = registry.craft(self.rules) else {
            return;
        };
        let mut needs_ammo = false;
        for weapon in &mut self.weapons {
            let ammo_max = registry.craft_weapon(weapon.rules).map_or(0, |w| w.ammo_max);
            weapon.rearming = weapon.ammo < ammo_max;
            needs_ammo |= weapon.rearming;
        }
        self.status = if self.damage > 0 {
            CraftStatus::Repairs
        } else if needs_ammo {
            CraftStatus::Rearming
        } else if self.fuel < rule.fuel_max {
            CraftStatus::Refuelling
        } else {
            CraftStatus::Ready
        };
    }

    /// React to `item` arriving in stores: a ready craft that was short on
    /// fuel or ammunition of that kind goes back to refuelling or rearming.
    pub fn reuse_item(&mut self, item: ItemTypeId, registry: &Registry) {
        if self.status != CraftStatus::Ready {
            return;
        }
        let Some(rule) = registry.craft(self.rules) else {
            return;
        };
        if rule.refuel_item == Some(item) && self.fuel < rule.fuel_max {
            self.status = CraftStatus::Refuelling;
        }
        for weapon in &mut self.weapons {
            let Some(weapon_rule) = registry.craft_weapon(weapon.rules) else {
                continue;
            };
            if weapon_rule.clip_item == Some(item) && weapon.ammo < weapon_rule.ammo_max {
                weapon.rearming = true;
                self.status = CraftStatus::Rearming;
            }
        }
    }
}
