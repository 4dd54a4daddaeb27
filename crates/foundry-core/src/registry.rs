use crate::craft::{CraftRule, CraftWeaponRule};
use crate::id::*;
use crate::manufacture::{ManufactureRule, PersonKind};
use crate::soldier::SoldierRule;
use std::collections::HashMap;
use std::sync::Arc;

/// Combat role of an item. Only [`BattleType::None`] items (components,
/// fuel, craft ammunition) can refresh craft supplies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleType {
    #[default]
    None,
    Firearm,
    Ammo,
    Melee,
    Grenade,
    Medikit,
    Armor,
    Corpse,
}

/// An item type definition in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRule {
    pub name: String,
    /// Base sale price, before the campaign's price coefficient.
    pub sell_cost: i64,
    pub battle_type: BattleType,
}

/// Builder for constructing an immutable Registry.
/// Three-phase lifecycle: registration -> mutation -> finalization.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    items: Vec<ItemRule>,
    item_name_to_id: HashMap<String, ItemTypeId>,
    craft_weapons: Vec<CraftWeaponRule>,
    craft_weapon_name_to_id: HashMap<String, CraftWeaponTypeId>,
    crafts: Vec<CraftRule>,
    craft_name_to_id: HashMap<String, CraftTypeId>,
    soldiers: Vec<SoldierRule>,
    soldier_name_to_id: HashMap<String, SoldierTypeId>,
    manufacture: Vec<ManufactureRule>,
    manufacture_name_to_id: HashMap<String, ManufactureId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase 1: Register an item type. Returns its ID.
    pub fn register_item(&mut self, rule: ItemRule) -> ItemTypeId {
        let id = ItemTypeId(self.items.len() as u32);
        self.item_name_to_id.insert(rule.name.clone(), id);
        self.items.push(rule);
        id
    }

    /// Phase 1: Register a craft weapon type. Returns its ID.
    pub fn register_craft_weapon(&mut self, rule: CraftWeaponRule) -> CraftWeaponTypeId {
        let id = CraftWeaponTypeId(self.craft_weapons.len() as u32);
        self.craft_weapon_name_to_id.insert(rule.name.clone(), id);
        self.craft_weapons.push(rule);
        id
    }

    /// Phase 1: Register a craft type. Returns its ID.
    pub fn register_craft(&mut self, rule: CraftRule) -> CraftTypeId {
        let id = CraftTypeId(self.crafts.len() as u32);
        self.craft_name_to_id.insert(rule.name.clone(), id);
        self.crafts.push(rule);
        id
    }

    /// Phase 1: Register a soldier type. Returns its ID.
    pub fn register_soldier(&mut self, rule: SoldierRule) -> SoldierTypeId {
        let id = SoldierTypeId(self.soldiers.len() as u32);
        self.soldier_name_to_id.insert(rule.name.clone(), id);
        self.soldiers.push(rule);
        id
    }

    /// Phase 1: Register a manufacture rule. Returns its ID.
    pub fn register_manufacture(&mut self, rule: ManufactureRule) -> ManufactureId {
        let id = ManufactureId(self.manufacture.len() as u32);
        self.manufacture_name_to_id.insert(rule.name.clone(), id);
        self.manufacture.push(rule);
        id
    }

    /// Phase 2: Mutate an existing manufacture rule by name.
    pub fn mutate_manufacture<F>(&mut self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut ManufactureRule),
    {
        let id = self
            .manufacture_name_to_id
            .get(name)
            .ok_or(RegistryError::NotFound(name.to_string()))?;
        f(&mut self.manufacture[id.0 as usize]);
        Ok(())
    }

    /// Phase 2: Mutate an existing craft type by name.
    pub fn mutate_craft<F>(&mut self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut CraftRule),
    {
        let id = self
            .craft_name_to_id
            .get(name)
            .ok_or(RegistryError::NotFound(name.to_string()))?;
        f(&mut self.crafts[id.0 as usize]);
        Ok(())
    }

    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        self.item_name_to_id.get(name).copied()
    }

    pub fn craft_id(&self, name: &str) -> Option<CraftTypeId> {
        self.craft_name_to_id.get(name).copied()
    }

    pub fn craft_weapon_id(&self, name: &str) -> Option<CraftWeaponTypeId> {
        self.craft_weapon_name_to_id.get(name).copied()
    }

    pub fn soldier_id(&self, name: &str) -> Option<SoldierTypeId> {
        self.soldier_name_to_id.get(name).copied()
    }

    /// Phase 3: Finalize and build the immutable registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let item_ok = |id: ItemTypeId| (id.0 as usize) < self.items.len();
        let craft_ok = |id: CraftTypeId| (id.0 as usize) < self.crafts.len();

        for weapon in &self.craft_weapons {
            if let Some(clip) = weapon.clip_item.filter(|&c| !item_ok(c)) {
                return Err(RegistryError::InvalidItemRef(clip));
            }
        }
        for craft in &self.crafts {
            if let Some(fuel) = craft.refuel_item.filter(|&f| !item_ok(f)) {
                return Err(RegistryError::InvalidItemRef(fuel));
            }
            for &weapon in &craft.fixed_weapons {
                if weapon.0 as usize >= self.craft_weapons.len() {
                    return Err(RegistryError::InvalidCraftWeaponRef(weapon));
                }
            }
        }
        for rule in &self.manufacture {
            if let Some(bad) = rule.referenced_items().find(|&i| !item_ok(i)) {
                return Err(RegistryError::InvalidItemRef(bad));
            }
            let crafts = rule
                .required_crafts
                .iter()
                .map(|c| c.craft_type)
                .chain(rule.produced_craft());
            for craft in crafts {
                if !craft_ok(craft) {
                    return Err(RegistryError::InvalidCraftRef(craft));
                }
            }
            if let Some(PersonKind::Soldier(soldier)) = rule.spawned_person.as_ref().map(|p| p.kind)
                && soldier.0 as usize >= self.soldiers.len()
            {
                return Err(RegistryError::InvalidSoldierRef(soldier));
            }
            if rule.random_outputs.iter().any(|o| o.weight == 0) {
                return Err(RegistryError::ZeroRewardWeight(rule.name.clone()));
            }
        }

        Ok(Registry {
            items: self.items,
            item_name_to_id: self.item_name_to_id,
            craft_weapons: self.craft_weapons,
            crafts: self.crafts,
            craft_name_to_id: self.craft_name_to_id,
            soldiers: self.soldiers,
            soldier_name_to_id: self.soldier_name_to_id,
            manufacture: self.manufacture.into_iter().map(Arc::new).collect(),
            manufacture_name_to_id: self.manufacture_name_to_id,
        })
    }
}

/// Immutable registry. Frozen after build(). Thread-safe to share.
///
/// Manufacture rules are handed out as `Arc`s so production orders can hold
/// their definition directly.
#[derive(Debug)]
pub struct Registry {
    items: Vec<ItemRule>,
    item_name_to_id: HashMap<String, ItemTypeId>,
    craft_weapons: Vec<CraftWeaponRule>,
    crafts: Vec<CraftRule>,
    craft_name_to_id: HashMap<String, CraftTypeId>,
    soldiers: Vec<SoldierRule>,
    soldier_name_to_id: HashMap<String, SoldierTypeId>,
    manufacture: Vec<Arc<ManufactureRule>>,
    manufacture_name_to_id: HashMap<String, ManufactureId>,
}

impl Registry {
    pub fn item(&self, id: ItemTypeId) -> Option<&ItemRule> {
        self.items.get(id.0 as usize)
    }

    pub fn craft(&self, id: CraftTypeId) -> Option<&CraftRule> {
        self.crafts.get(id.0 as usize)
    }

    pub fn craft_weapon(&self, id: CraftWeaponTypeId) -> Option<&CraftWeaponRule> {
        self.craft_weapons.get(id.0 as usize)
    }

    pub fn soldier(&self, id: SoldierTypeId) -> Option<&SoldierRule> {
        self.soldiers.get(id.0 as usize)
    }

    pub fn manufacture(&self, id: ManufactureId) -> Option<&Arc<ManufactureRule>> {
        self.manufacture.get(id.0 as usize)
    }

    pub fn manufacture_by_name(&self, name: &str) -> Option<&Arc<ManufactureRule>> {
        self.manufacture_id(name).and_then(|id| self.manufacture(id))
    }

    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        self.item_name_to_id.get(name).copied()
    }

    pub fn craft_id(&self, name: &str) -> Option<CraftTypeId> {
        self.craft_name_to_id.get(name).copied()
    }

    pub fn soldier_id(&self, name: &str) -> Option<SoldierTypeId> {
        self.soldier_name_to_id.get(name).copied()
    }

    pub fn manufacture_id(&self, name: &str) -> Option<ManufactureId> {
        self.manufacture_name_to_id.get(name).copied()
    }

    /// Name of an item type, used as the key of persisted reward tallies.
    pub fn item_name(&self, id: ItemTypeId) -> Option<&str> {
        self.item(id).map(|i| i.name.as_str())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn craft_count(&self) -> usize {
        self.crafts.len()
    }

    pub fn manufacture_count(&self) -> usize {
        self.manufacture.len()
    }

    /// All manufacture rules in registration order.
    pub fn manufacture_rules(&self) -> impl Iterator<Item = &Arc<ManufactureRule>> {
        self.manufacture.iter()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid item reference: {0:?}")]
    InvalidItemRef(ItemTypeId),
    #[error("invalid craft reference: {0:?}")]
    InvalidCraftRef(CraftTypeId),
    #[error("invalid craft weapon reference: {0:?}")]
    InvalidCraftWeaponRef(CraftWeaponTypeId),
    #[error("invalid soldier reference: {0:?}")]
    InvalidSoldierRef(SoldierTypeId),
    #[error("manufacture '{0}' has a random outcome with zero weight")]
    ZeroRewardWeight(String),
}
