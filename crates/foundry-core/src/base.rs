//! A base: its resource ledger and its active production orders.

use crate::campaign::Campaign;
use crate::craft::{Craft, CraftStatus};
use crate::id::{CraftId, CraftTypeId, ItemTypeId};
use crate::item::ItemContainer;
use crate::manufacture::ManufactureRule;
use crate::production::{Production, ProductionContext, ProductionProgress};
use crate::registry::{BattleType, Registry};
use crate::soldier::Soldier;
use crate::transfer::{Transfer, TransferPayload};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Everything at a base that production reads or writes: stores, crafts,
/// personnel, incoming transfers, and housing.
///
/// Shared mutably by every order of the base. Not synchronized: callers step
/// one order at a time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseLedger {
    pub storage: ItemContainer,
    crafts: SlotMap<CraftId, Craft>,
    /// Roster order. Production consumes crafts front to back.
    craft_order: Vec<CraftId>,
    pub soldiers: Vec<Soldier>,
    pub scientists: u32,
    pub engineers: u32,
    pub transfers: Vec<Transfer>,
    pub living_quarters: u32,
    /// Beds held by running person-spawning orders. Maintained by [`Base`].
    #[serde(skip)]
    reserved_quarters: u32,
}

impl BaseLedger {
    pub fn new(living_quarters: u32) -> Self {
        Self {
            living_quarters,
            ..Default::default()
        }
    }

    pub fn add_craft(&mut self, craft: Craft) -> CraftId {
        let id = self.crafts.insert(craft);
        self.craft_order.push(id);
        id
    }

    pub fn remove_craft(&mut self, id: CraftId) -> Option<Craft> {
        let craft = self.crafts.remove(id)?;
        self.craft_order.retain(|&c| c != id);
        Some(craft)
    }

    pub fn craft(&self, id: CraftId) -> Option<&Craft> {
        self.crafts.get(id)
    }

    pub fn craft_mut(&mut self, id: CraftId) -> Option<&mut Craft> {
        self.crafts.get_mut(id)
    }

    /// Crafts in roster order.
    pub fn crafts(&self) -> impl Iterator<Item = (CraftId, &Craft)> + '_ {
        self.craft_order
            .iter()
            .filter_map(|&id| self.crafts.get(id).map(|c| (id, c)))
    }

    pub fn craft_count(&self) -> usize {
        self.crafts.len()
    }

    /// Crafts of `craft_type` at the base and available to be consumed.
    pub fn craft_count_for_production(&self, craft_type: CraftTypeId) -> u32 {
        self.crafts()
            .filter(|(_, c)| c.rules == craft_type && c.status != CraftStatus::Out)
            .count() as u32
    }

    pub fn first_craft_for_production(&self, craft_type: CraftTypeId) -> Option<CraftId> {
        self.crafts()
            .find(|(_, c)| c.rules == craft_type && c.status != CraftStatus::Out)
            .map(|(id, _)| id)
    }

    /// Put items into stores. Non-battle items may be fuel or craft
    /// ammunition, so every craft gets a chance to start resupplying.
    pub fn store_item(&mut self, item: ItemTypeId, quantity: u32, registry: &Registry) {
        self.storage.add(item, quantity);
        let battle_type = registry.item(item).map_or(BattleType::None, |r| r.battle_type);
        if battle_type == BattleType::None {
            for craft in self.crafts.values_mut() {
                craft.reuse_item(item, registry);
            }
        }
    }

    pub fn available_quarters(&self) -> u32 {
        self.living_quarters
    }

    /// Current residents, personnel in transit, and one bed per
    /// person-spawning order, held or not.
    pub fn used_quarters(&self) -> u32 {
        let in_transit: u32 = self.transfers.iter().map(|t| t.payload.personnel()).sum();
        self.soldiers.len() as u32 + self.scientists + self.engineers + in_transit + self.reserved_quarters
    }

    fn deliver(&mut self, payload: TransferPayload) {
        match payload {
            TransferPayload::Scientists(n) => self.scientists += n,
            TransferPayload::Engineers(n) => self.engineers += n,
            TransferPayload::Soldier(soldier) => self.soldiers.push(soldier),
        }
    }
}

// ---------------------------------------------------------------------------
// Base
// ---------------------------------------------------------------------------

/// Why a production command was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductionError {
    #[error("production amount must be at least 1")]
    InvalidAmount,
    #[error("not enough money to start {0}")]
    NotEnoughMoney(String),
    #[error("not enough living space to start {0}")]
    NotEnoughLivingSpace(String),
    #[error("not enough materials to start {0}")]
    NotEnoughMaterials(String),
    #[error("requested {requested} engineers but only {available} are free")]
    NotEnoughEngineers { requested: u32, available: u32 },
    #[error("no production at index {0}")]
    NoSuchProduction(usize),
}

/// Outcome of one order during [`Base::step_productions`]. Orders that
/// simply made progress are not reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionReport {
    pub manufacture: String,
    pub progress: ProductionProgress,
}

#[derive(Debug, Clone)]
pub struct Base {
    pub name: String,
    pub ledger: BaseLedger,
    productions: Vec<Production>,
}

impl Base {
    pub fn new(name: impl Into<String>, ledger: BaseLedger) -> Self {
        Self {
            name: name.into(),
            ledger,
            productions: Vec::new(),
        }
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production_mut(&mut self, index: usize) -> Option<&mut Production> {
        self.productions.get_mut(index)
    }

    /// Adopt an already-paid order, e.g. one restored from a save.
    pub fn add_production(&mut self, production: Production) -> usize {
        self.productions.push(production);
        self.refresh_reserved_quarters();
        self.productions.len() - 1
    }

    /// Engineers assigned to any order.
    pub fn allocated_engineers(&self) -> u32 {
        self.productions.iter().map(|p| p.assigned_engineers()).sum()
    }

    pub fn available_engineers(&self) -> u32 {
        self.ledger.engineers.saturating_sub(self.allocated_engineers())
    }

    /// Commit to `amount` units of `rules` and pay for the first one.
    pub fn start_production(
        &mut self,
        rules: Arc<ManufactureRule>,
        amount: u32,
        campaign: &mut Campaign,
    ) -> Result<usize, ProductionError> {
        if amount == 0 {
            return Err(ProductionError::InvalidAmount);
        }
        let mut production = Production::new(rules, amount);
        // The new order's own bed must be free before it is admitted.
        self.ledger.reserved_quarters =
            self.production_quarters() + u32::from(production.rules().spawns_person());
        let admitted = production.check_one_more_unit(&self.ledger, campaign);
        self.refresh_reserved_quarters();
        admitted.map_err(|blocked| {
            let name = production.rules().name.clone();
            match blocked {
                ProductionProgress::BlockedFunds => ProductionError::NotEnoughMoney(name),
                ProductionProgress::BlockedLivingSpace => ProductionError::NotEnoughLivingSpace(name),
                _ => ProductionError::NotEnoughMaterials(name),
            }
        })?;
        production.start_item(&mut self.ledger, campaign);
        log::debug!("{}: queued {} x{amount}", self.name, production.rules().name);
        Ok(self.add_production(production))
    }

    /// Set the engineers working on one order, bounded by free engineers.
    pub fn assign_engineers(&mut self, index: usize, engineers: u32) -> Result<(), ProductionError> {
        let current = self
            .productions
            .get(index)
            .ok_or(ProductionError::NoSuchProduction(index))?
            .assigned_engineers();
        let available = self.available_engineers() + current;
        if engineers > available {
            return Err(ProductionError::NotEnoughEngineers {
                requested: engineers,
                available,
            });
        }
        self.productions[index].set_assigned_engineers(engineers);
        self.refresh_reserved_quarters();
        Ok(())
    }

    /// Remove an order. The unit in progress is refunded, except for any
    /// crafts it consumed.
    pub fn cancel_production(
        &mut self,
        index: usize,
        campaign: &mut Campaign,
    ) -> Result<Production, ProductionError> {
        if index >= self.productions.len() {
            return Err(ProductionError::NoSuchProduction(index));
        }
        let production = self.productions.remove(index);
        if !production.awaiting_start() && !production.is_finished() {
            production.refund_item(&mut self.ledger, campaign);
        }
        self.refresh_reserved_quarters();
        Ok(production)
    }

    /// Step a single order without removing it.
    pub fn step_production(
        &mut self,
        index: usize,
        ctx: &mut ProductionContext<'_>,
    ) -> Option<ProductionProgress> {
        self.refresh_reserved_quarters();
        let production = self.productions.get_mut(index)?;
        Some(production.step(&mut self.ledger, ctx))
    }

    /// One hour of manufacturing: step every order, drop completed ones, and
    /// report completions and blocked starts.
    pub fn step_productions(&mut self, ctx: &mut ProductionContext<'_>) -> Vec<ProductionReport> {
        self.refresh_reserved_quarters();
        let mut reports = Vec::new();
        let mut finished = Vec::new();
        for (index, production) in self.productions.iter_mut().enumerate() {
            let progress = production.step(&mut self.ledger, ctx);
            match progress {
                ProductionProgress::NotComplete => continue,
                ProductionProgress::Complete => {
                    log::info!("{}: production of {} complete", self.name, production.rules().name);
                    finished.push(index);
                }
                blocked => {
                    log::warn!("{}: production of {} halted: {blocked:?}", self.name, production.rules().name);
                }
            }
            reports.push(ProductionReport {
                manufacture: production.rules().name.clone(),
                progress,
            });
        }
        for index in finished.into_iter().rev() {
            self.productions.remove(index);
        }
        self.refresh_reserved_quarters();
        reports
    }

    /// Count down transfers and move arrivals into the base. Returns the
    /// number of transfers delivered.
    pub fn advance_transfers(&mut self, hours: u32) -> usize {
        let mut arrived = Vec::new();
        self.ledger.transfers.retain_mut(|t| {
            if t.advance(hours) {
                arrived.push(t.payload.clone());
                false
            } else {
                true
            }
        });
        let delivered = arrived.len();
        for payload in arrived {
            self.ledger.deliver(payload);
        }
        delivered
    }

    fn production_quarters(&self) -> u32 {
        self.productions
            .iter()
            .filter(|p| p.rules().spawns_person())
            .count() as u32
    }

    fn refresh_reserved_quarters(&mut self) {
        self.ledger.reserved_quarters = self.production_quarters();
    }
}
