//! Manufacture rules: what one unit of production costs and yields.

use crate::id::{CraftTypeId, ItemTypeId, SoldierTypeId};
use crate::item::ItemQuantity;
use crate::soldier::SoldierTemplate;

/// A required number of crafts of one type, consumed when a unit starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CraftQuantity {
    pub craft_type: CraftTypeId,
    pub quantity: u32,
}

/// What a completed unit yields. Items and crafts are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductionOutput {
    Items(Vec<ItemQuantity>),
    Craft(CraftTypeId),
}

impl Default for ProductionOutput {
    fn default() -> Self {
        ProductionOutput::Items(Vec::new())
    }
}

/// One weighted row of a random-reward table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomOutcome {
    /// Positive relative weight.
    pub weight: u32,
    pub items: Vec<ItemQuantity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonKind {
    Scientist,
    Engineer,
    Soldier(SoldierTypeId),
}

/// A person delivered to the base for every completed unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedPerson {
    pub kind: PersonKind,
    /// Localization key for a fixed soldier name. Generated when `None`.
    pub name: Option<String>,
    pub template: SoldierTemplate,
}

/// An immutable manufacture definition, shared by every order that uses it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManufactureRule {
    pub name: String,
    pub category: String,
    /// Money charged when each unit starts.
    pub cost: i64,
    /// Engineer-hours per unit. Zero means the order is instant.
    pub time: u32,
    pub required_items: Vec<ItemQuantity>,
    pub required_crafts: Vec<CraftQuantity>,
    pub output: ProductionOutput,
    pub random_outputs: Vec<RandomOutcome>,
    pub spawned_person: Option<SpawnedPerson>,
    /// Research score per completed unit. May be negative.
    pub points: i32,
}

impl ManufactureRule {
    pub fn is_instant(&self) -> bool {
        self.time == 0
    }

    pub fn have_enough_money_for_one_more_unit(&self, funds: i64) -> bool {
        self.cost <= 0 || funds >= self.cost
    }

    pub fn produced_craft(&self) -> Option<CraftTypeId> {
        match self.output {
            ProductionOutput::Craft(craft) => Some(craft),
            ProductionOutput::Items(_) => None,
        }
    }

    pub fn produced_items(&self) -> &[ItemQuantity] {
        match &self.output {
            ProductionOutput::Items(items) => items,
            ProductionOutput::Craft(_) => &[],
        }
    }

    pub fn has_random_outputs(&self) -> bool {
        !self.random_outputs.is_empty()
    }

    pub fn spawns_person(&self) -> bool {
        self.spawned_person.is_some()
    }

    /// Every item type this rule reads or writes, for reference validation.
    pub fn referenced_items(&self) -> impl Iterator<Item = ItemTypeId> + '_ {
        self.required_items
            .iter()
            .chain(self.produced_items())
            .chain(self.random_outputs.iter().flat_map(|o| o.items.iter()))
            .map(|q| q.item_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laser_rifle() -> ManufactureRule {
        ManufactureRule {
            name: "STR_LASER_RIFLE".to_string(),
            cost: 8000,
            time: 700,
            required_items: vec![ItemQuantity::new(ItemTypeId(0), 2)],
            output: ProductionOutput::Items(vec![ItemQuantity::new(ItemTypeId(1), 1)]),
            ..Default::default()
        }
    }

    #[test]
    fn money_check() {
        let rule = laser_rifle();
        assert!(rule.have_enough_money_for_one_more_unit(8000));
        assert!(!rule.have_enough_money_for_one_more_unit(7999));
    }

    #[test]
    fn free_rule_passes_with_debt() {
        let rule = ManufactureRule {
            cost: 0,
            ..laser_rifle()
        };
        assert!(rule.have_enough_money_for_one_more_unit(-500));
    }

    #[test]
    fn craft_output_has_no_items() {
        let rule = ManufactureRule {
            output: ProductionOutput::Craft(CraftTypeId(2)),
            ..laser_rifle()
        };
        assert_eq!(rule.produced_craft(), Some(CraftTypeId(2)));
        assert!(rule.produced_items().is_empty());
    }

    #[test]
    fn referenced_items_cover_all_tables() {
        let mut rule = laser_rifle();
        rule.random_outputs.push(RandomOutcome {
            weight: 1,
            items: vec![ItemQuantity::new(ItemTypeId(5), 1)],
        });
        let refs: Vec<_> = rule.referenced_items().collect();
        assert_eq!(refs, vec![ItemTypeId(0), ItemTypeId(1), ItemTypeId(5)]);
    }

    #[test]
    fn instant_rule() {
        let rule = ManufactureRule {
            time: 0,
            ..laser_rifle()
        };
        assert!(rule.is_instant());
        assert!(!rule.spawns_person());
        assert!(!rule.has_random_outputs());
    }
}
