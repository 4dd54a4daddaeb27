//! Campaign-wide state touched by production: funds, research score, and
//! per-type serial numbers for new crafts and soldiers.

use crate::fixed::{Fixed64, scale_money};
use crate::id::{CraftTypeId, ItemTypeId};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunables loaded with the game content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub starting_funds: i64,
    /// Multiplier applied to every item's sale price (difficulty setting).
    pub sell_price_coefficient: Fixed64,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            starting_funds: 0,
            sell_price_coefficient: Fixed64::from_num(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    funds: i64,
    research_score: i64,
    sell_price_coefficient: Fixed64,
    craft_ids: BTreeMap<CraftTypeId, u32>,
    next_soldier_id: u32,
}

impl Campaign {
    pub fn new(config: &CampaignConfig) -> Self {
        Self {
            funds: config.starting_funds,
            research_score: 0,
            sell_price_coefficient: config.sell_price_coefficient,
            craft_ids: BTreeMap::new(),
            next_soldier_id: 1,
        }
    }

    pub fn funds(&self) -> i64 {
        self.funds
    }

    pub fn set_funds(&mut self, funds: i64) {
        self.funds = funds;
    }

    pub fn add_funds(&mut self, amount: i64) {
        self.funds = self.funds.saturating_add(amount);
    }

    pub fn research_score(&self) -> i64 {
        self.research_score
    }

    pub fn add_research_score(&mut self, points: i32) {
        self.research_score += points as i64;
    }

    /// Sale price of one item after the campaign's price coefficient.
    /// Unknown items sell for nothing.
    pub fn sell_cost_adjusted(&self, registry: &Registry, item: ItemTypeId) -> i64 {
        registry
            .item(item)
            .map_or(0, |rule| scale_money(rule.sell_cost, self.sell_price_coefficient))
    }

    /// Next serial number for a craft of `craft_type`, starting at 1.
    pub fn next_craft_id(&mut self, craft_type: CraftTypeId) -> u32 {
        let next = self.craft_ids.entry(craft_type).or_insert(0);
        *next += 1;
        *next
    }

    pub fn next_soldier_id(&mut self) -> u32 {
        let id = self.next_soldier_id;
        self.next_soldier_id += 1;
        id
    }
}
