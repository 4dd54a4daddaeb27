//! Production orders and the hourly stepper.
//!
//! A [`Production`] accumulates engineer-hours against a shared
//! [`ManufactureRule`]. Each call to [`Production::step`] adds the assigned
//! engineers to the accumulated time, applies the effects of every unit whose
//! time threshold was crossed, and pays for the next unit. Resources for a
//! unit are always consumed when the unit starts, never when it completes.

use crate::base::BaseLedger;
use crate::campaign::Campaign;
use crate::craft::Craft;
use crate::language::Language;
use crate::manufacture::{ManufactureRule, PersonKind, SpawnedPerson};
use crate::registry::Registry;
use crate::reward;
use crate::rng::RandomSource;
use crate::soldier::Soldier;
use crate::transfer::{SPAWNED_PERSON_TRANSFER_HOURS, Transfer, TransferPayload};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of one [`Production::step`].
///
/// `Complete` is terminal: the caller removes the order. The blocked
/// variants are advisory: the order stays active, nothing was consumed, and
/// the start is retried on the next staffed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ProductionProgress {
    Complete,
    NotComplete,
    BlockedFunds,
    BlockedMaterials,
    BlockedLivingSpace,
}

impl ProductionProgress {
    pub fn is_terminal(self) -> bool {
        self == ProductionProgress::Complete
    }

    pub fn is_blocked(self) -> bool {
        matches!(
            self,
            ProductionProgress::BlockedFunds
                | ProductionProgress::BlockedMaterials
                | ProductionProgress::BlockedLivingSpace
        )
    }
}

/// Collaborators a step needs besides the base's own ledger.
pub struct ProductionContext<'a> {
    pub registry: &'a Registry,
    pub campaign: &'a mut Campaign,
    pub rng: &'a mut dyn RandomSource,
    pub lang: &'a dyn Language,
}

/// A base's commitment to manufacture `amount` units of one rule.
#[derive(Debug, Clone)]
pub struct Production {
    rules: Arc<ManufactureRule>,
    amount: u32,
    infinite: bool,
    time_spent: u32,
    engineers: u32,
    sell: bool,
    awaiting_start: bool,
    random_production_info: BTreeMap<String, u32>,
}

impl Production {
    /// A fresh order with no progress and nobody assigned. The first unit
    /// counts as started; use [`crate::base::Base::start_production`] to
    /// commit an order and pay for that unit.
    pub fn new(rules: Arc<ManufactureRule>, amount: u32) -> Self {
        Self {
            rules,
            amount,
            infinite: false,
            time_spent: 0,
            engineers: 0,
            sell: false,
            awaiting_start: false,
            random_production_info: BTreeMap::new(),
        }
    }

    pub fn rules(&self) -> &Arc<ManufactureRule> {
        &self.rules
    }

    pub fn amount_total(&self) -> u32 {
        self.amount
    }

    pub fn set_amount_total(&mut self, amount: u32) {
        self.amount = amount;
    }

    pub fn infinite_amount(&self) -> bool {
        self.infinite
    }

    pub fn set_infinite_amount(&mut self, infinite: bool) {
        self.infinite = infinite;
    }

    pub fn time_spent(&self) -> u32 {
        self.time_spent
    }

    pub fn set_time_spent(&mut self, time_spent: u32) {
        self.time_spent = time_spent;
    }

    pub fn assigned_engineers(&self) -> u32 {
        self.engineers
    }

    pub fn set_assigned_engineers(&mut self, engineers: u32) {
        self.engineers = engineers;
    }

    pub fn sell_items(&self) -> bool {
        self.sell
    }

    pub fn set_sell_items(&mut self, sell: bool) {
        self.sell = sell;
    }

    /// `true` while the next unit is waiting for resources to start.
    pub fn awaiting_start(&self) -> bool {
        self.awaiting_start
    }

    pub(crate) fn set_awaiting_start(&mut self, awaiting: bool) {
        self.awaiting_start = awaiting;
    }

    /// Random rewards delivered so far, keyed by item name.
    pub fn random_production_info(&self) -> &BTreeMap<String, u32> {
        &self.random_production_info
    }

    pub(crate) fn set_random_production_info(&mut self, info: BTreeMap<String, u32>) {
        self.random_production_info = info;
    }

    /// No progress made yet and nobody assigned.
    pub fn is_queued_only(&self) -> bool {
        self.time_spent == 0 && self.engineers == 0
    }

    /// Units whose time threshold has been reached. Instant rules count as
    /// fully produced.
    pub fn amount_produced(&self) -> u32 {
        if self.rules.time > 0 {
            self.time_spent / self.rules.time
        } else {
            self.amount
        }
    }

    /// Reached the target and not running in infinite mode.
    pub fn is_finished(&self) -> bool {
        !self.infinite && self.amount_produced() >= self.amount
    }

    // -----------------------------------------------------------------------
    // Admission checks
    // -----------------------------------------------------------------------

    pub fn have_enough_money_for_one_more_unit(&self, campaign: &Campaign) -> bool {
        self.rules.have_enough_money_for_one_more_unit(campaign.funds())
    }

    /// Only person-spawning rules need housing. A running order's own
    /// occupant is already included in the base's used quarters.
    pub fn have_enough_living_space_for_one_more_unit(&self, base: &BaseLedger) -> bool {
        !self.rules.spawns_person() || base.available_quarters() >= base.used_quarters()
    }

    pub fn have_enough_materials_for_one_more_unit(&self, base: &BaseLedger) -> bool {
        self.rules
            .required_items
            .iter()
            .all(|req| base.storage.quantity(req.item_type) >= req.quantity)
            && self
                .rules
                .required_crafts
                .iter()
                .all(|req| base.craft_count_for_production(req.craft_type) >= req.quantity)
    }

    /// Run the admission checks in their canonical order: funds, living
    /// space, materials. Returns the first failing status.
    pub fn check_one_more_unit(
        &self,
        base: &BaseLedger,
        campaign: &Campaign,
    ) -> Result<(), ProductionProgress> {
        if !self.have_enough_money_for_one_more_unit(campaign) {
            return Err(ProductionProgress::BlockedFunds);
        }
        if !self.have_enough_living_space_for_one_more_unit(base) {
            return Err(ProductionProgress::BlockedLivingSpace);
        }
        if !self.have_enough_materials_for_one_more_unit(base) {
            return Err(ProductionProgress::BlockedMaterials);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Start / refund
    // -----------------------------------------------------------------------

    /// Pay for one unit: cost, required items, and the first matching craft
    /// of each required craft type in roster order. Callers run
    /// [`Self::check_one_more_unit`] first.
    pub(crate) fn start_item(&mut self, base: &mut BaseLedger, campaign: &mut Campaign) {
        campaign.add_funds(-self.rules.cost);
        for req in &self.rules.required_items {
            let removed = base.storage.remove(req.item_type, req.quantity);
            debug_assert_eq!(removed, req.quantity, "{} started without its materials", self.rules.name);
        }
        for req in &self.rules.required_crafts {
            if let Some(id) = base.first_craft_for_production(req.craft_type) {
                base.remove_craft(id);
            }
        }
        self.awaiting_start = false;
        log::debug!("started a unit of {}", self.rules.name);
    }

    /// Give back the cost and required items of the unit in progress.
    /// Consumed crafts are not returned.
    pub(crate) fn refund_item(&self, base: &mut BaseLedger, campaign: &mut Campaign) {
        campaign.add_funds(self.rules.cost);
        for req in &self.rules.required_items {
            base.storage.add(req.item_type, req.quantity);
        }
    }

    // -----------------------------------------------------------------------
    // Step
    // -----------------------------------------------------------------------

    /// Advance the order by one hour.
    pub fn step(&mut self, base: &mut BaseLedger, ctx: &mut ProductionContext<'_>) -> ProductionProgress {
        if self.is_finished() {
            return ProductionProgress::Complete;
        }
        if self.engineers == 0 {
            return ProductionProgress::NotComplete;
        }
        if self.awaiting_start {
            if let Err(blocked) = self.check_one_more_unit(base, ctx.campaign) {
                return blocked;
            }
            self.start_item(base, ctx.campaign);
        }

        let rules = Arc::clone(&self.rules);
        let done = self.amount_produced();
        self.time_spent = self.time_spent.saturating_add(self.engineers);
        let now = self.amount_produced();

        if done < now {
            // Never overproduce a finite order.
            let produced = if self.infinite { now - done } else { now.min(self.amount) - done };
            for count in 1..=produced {
                self.complete_unit(&rules, base, ctx);
                if count < produced {
                    if let Err(blocked) = self.check_one_more_unit(base, ctx.campaign) {
                        self.block(done + count);
                        return blocked;
                    }
                    self.start_item(base, ctx.campaign);
                }
            }
        }

        if self.is_finished() {
            return ProductionProgress::Complete;
        }
        if done < now {
            if let Err(blocked) = self.check_one_more_unit(base, ctx.campaign) {
                self.block(now);
                return blocked;
            }
            self.start_item(base, ctx.campaign);
        }
        ProductionProgress::NotComplete
    }

    /// Hold the order at exactly `completed` units until the next unit can
    /// be paid for. Labor past that point belongs to a unit that never
    /// started, so it is dropped.
    fn block(&mut self, completed: u32) {
        self.time_spent = self.time_spent.min(completed.saturating_mul(self.rules.time));
        self.awaiting_start = true;
    }

    fn complete_unit(&mut self, rules: &ManufactureRule, base: &mut BaseLedger, ctx: &mut ProductionContext<'_>) {
        if let Some(craft_type) = rules.produced_craft() {
            let mut craft = Craft::new(craft_type, ctx.campaign.next_craft_id(craft_type));
            craft.init_fixed_weapons(ctx.registry);
            craft.checkup(ctx.registry);
            base.add_craft(craft);
        } else {
            for output in rules.produced_items() {
                if self.sell {
                    let value = ctx
                        .campaign
                        .sell_cost_adjusted(ctx.registry, output.item_type)
                        .saturating_mul(output.quantity as i64);
                    ctx.campaign.add_funds(value);
                } else {
                    base.store_item(output.item_type, output.quantity, ctx.registry);
                }
            }
        }

        if rules.has_random_outputs() {
            self.apply_random_reward(rules, base, ctx);
        }
        if let Some(person) = &rules.spawned_person {
            spawn_person(person, base, ctx);
        }
        if rules.points != 0 {
            ctx.campaign.add_research_score(rules.points);
        }
        log::debug!("completed a unit of {}", rules.name);
    }

    fn apply_random_reward(&mut self, rules: &ManufactureRule, base: &mut BaseLedger, ctx: &mut ProductionContext<'_>) {
        let Some(outcome) = reward::roll_outcome(&rules.random_outputs, ctx.rng) else {
            return;
        };
        for reward in &outcome.items {
            base.store_item(reward.item_type, reward.quantity, ctx.registry);
            let name = ctx.registry.item_name(reward.item_type).unwrap_or_default();
            *self.random_production_info.entry(name.to_string()).or_insert(0) += reward.quantity;
        }
    }
}

fn spawn_person(person: &SpawnedPerson, base: &mut BaseLedger, ctx: &mut ProductionContext<'_>) {
    let payload = match person.kind {
        PersonKind::Scientist => TransferPayload::Scientists(1),
        PersonKind::Engineer => TransferPayload::Engineers(1),
        PersonKind::Soldier(soldier_type) => {
            let Some(rule) = ctx.registry.soldier(soldier_type) else {
                log::warn!("unknown soldier type {soldier_type:?}; nobody spawned");
                return;
            };
            let nationality = rule.select_nationality(ctx.rng);
            let id = ctx.campaign.next_soldier_id();
            let mut soldier = Soldier::generate(id, soldier_type, rule, nationality, ctx.rng);
            soldier.apply_template(&person.template);
            match &person.name {
                Some(key) => soldier.set_name(ctx.lang.get_string(key)),
                None => soldier.gen_name(rule, ctx.rng),
            }
            TransferPayload::Soldier(soldier)
        }
    };
    base.transfers
        .push(Transfer::new(SPAWNED_PERSON_TRANSFER_HOURS, payload));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn queued_only_until_progress_or_staff() {
        let registry = sample_registry();
        let mut p = Production::new(manufacture(&registry, "STR_LASER_RIFLE"), 3);
        assert!(p.is_queued_only());
        p.set_assigned_engineers(5);
        assert!(!p.is_queued_only());
        p.set_assigned_engineers(0);
        p.set_time_spent(1);
        assert!(!p.is_queued_only());
    }

    #[test]
    fn start_item_takes_exactly_the_required_items() {
        let registry = sample_registry();
        let alloys = item(&registry, "STR_ALIEN_ALLOYS");
        let mut fx = Fixture::new(&registry, 100_000);
        fx.base.ledger.storage.add(alloys, 9);
        let mut p = Production::new(manufacture(&registry, "STR_PERSONAL_ARMOR"), 2);
        assert!(p.check_one_more_unit(&fx.base.ledger, &fx.campaign).is_ok());
        p.start_item(&mut fx.base.ledger, &mut fx.campaign);
        assert_eq!(fx.base.ledger.storage.quantity(alloys), 5);
        assert_eq!(fx.campaign.funds(), 100_000 - 22_000);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "started without its materials")]
    fn start_item_without_materials_is_caught() {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 100_000);
        fx.base.ledger.storage.add(item(&registry, "STR_ALIEN_ALLOYS"), 1);
        let mut p = Production::new(manufacture(&registry, "STR_PERSONAL_ARMOR"), 1);
        p.start_item(&mut fx.base.ledger, &mut fx.campaign);
    }

    #[test]
    fn amount_produced_divides_time() {
        let registry = sample_registry();
        let rules = manufacture(&registry, "STR_LASER_RIFLE");
        let time = rules.time;
        let mut p = Production::new(rules, 3);
        p.set_time_spent(time * 2 + 1);
        assert_eq!(p.amount_produced(), 2);
    }

    #[test]
    fn instant_rule_counts_as_produced() {
        let p = Production::new(simple_rule("instant", 0, 0), 4);
        assert_eq!(p.amount_produced(), 4);
        assert!(p.is_finished());
    }

    #[test]
    fn infinite_order_never_finishes() {
        let mut p = Production::new(simple_rule("r", 10, 0), 1);
        p.set_infinite_amount(true);
        p.set_time_spent(1000);
        assert!(!p.is_finished());
    }

    #[test]
    fn progress_classification() {
        assert!(ProductionProgress::Complete.is_terminal());
        assert!(!ProductionProgress::NotComplete.is_blocked());
        assert!(ProductionProgress::BlockedFunds.is_blocked());
        assert!(ProductionProgress::BlockedMaterials.is_blocked());
        assert!(ProductionProgress::BlockedLivingSpace.is_blocked());
        assert!(!ProductionProgress::BlockedLivingSpace.is_terminal());
    }

    #[test]
    fn simple_completion() {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 1000);
        let rules = simple_rule("STR_WIDGET", 10, 100);
        let index = fx.base.start_production(rules, 1, &mut fx.campaign).unwrap();
        assert_eq!(fx.campaign.funds(), 900);
        fx.base.assign_engineers(index, 10).unwrap();

        let progress = fx.step(index);
        assert_eq!(progress, ProductionProgress::Complete);
        assert_eq!(fx.base.productions()[index].time_spent(), 10);
        assert_eq!(fx.base.productions()[index].amount_produced(), 1);
        assert_eq!(fx.campaign.funds(), 900);
    }

    #[test]
    fn zero_engineers_is_a_no_op() {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 1000);
        let index = fx
            .base
            .start_production(simple_rule("r", 10, 100), 2, &mut fx.campaign)
            .unwrap();
        for _ in 0..5 {
            assert_eq!(fx.step(index), ProductionProgress::NotComplete);
        }
        assert_eq!(fx.base.productions()[index].time_spent(), 0);
        assert_eq!(fx.campaign.funds(), 900);
    }

    #[test]
    fn partial_progress_keeps_accumulating() {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 1000);
        let index = fx
            .base
            .start_production(simple_rule("r", 10, 100), 2, &mut fx.campaign)
            .unwrap();
        fx.base.assign_engineers(index, 3).unwrap();
        for _ in 0..3 {
            assert_eq!(fx.step(index), ProductionProgress::NotComplete);
        }
        assert_eq!(fx.base.productions()[index].time_spent(), 9);
        assert_eq!(fx.campaign.funds(), 900);
        assert_eq!(fx.step(index), ProductionProgress::NotComplete);
        // First unit done, second unit paid for.
        assert_eq!(fx.campaign.funds(), 800);
    }

    #[test]
    fn blocked_by_funds_mid_batch() {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 100);
        let index = fx
            .base
            .start_production(simple_rule("r", 10, 100), 2, &mut fx.campaign)
            .unwrap();
        assert_eq!(fx.campaign.funds(), 0);
        fx.base.assign_engineers(index, 20).unwrap();

        assert_eq!(fx.step(index), ProductionProgress::BlockedFunds);
        let p = &fx.base.productions()[index];
        assert_eq!(p.amount_produced(), 1);
        assert!(p.awaiting_start());
        assert_eq!(fx.campaign.funds(), 0);
    }

    #[test]
    fn blocked_order_resumes_once_paid() {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 100);
        let index = fx
            .base
            .start_production(simple_rule("r", 10, 100), 2, &mut fx.campaign)
            .unwrap();
        fx.base.assign_engineers(index, 20).unwrap();
        assert_eq!(fx.step(index), ProductionProgress::BlockedFunds);

        // Still broke: no time passes.
        assert_eq!(fx.step(index), ProductionProgress::BlockedFunds);
        assert_eq!(fx.base.productions()[index].time_spent(), 10);

        fx.campaign.add_funds(100);
        assert_eq!(fx.step(index), ProductionProgress::Complete);
        assert_eq!(fx.campaign.funds(), 0);
    }

    #[test]
    fn completed_order_is_stable() {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 1000);
        let index = fx
            .base
            .start_production(simple_rule("r", 10, 100), 1, &mut fx.campaign)
            .unwrap();
        fx.base.assign_engineers(index, 10).unwrap();
        assert_eq!(fx.step(index), ProductionProgress::Complete);
        let funds = fx.campaign.funds();
        let spent = fx.base.productions()[index].time_spent();
        assert_eq!(fx.step(index), ProductionProgress::Complete);
        assert_eq!(fx.campaign.funds(), funds);
        assert_eq!(fx.base.productions()[index].time_spent(), spent);
    }

    #[test]
    fn blocked_materials_after_batch() {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 1_000_000);
        let alloys = item(&registry, "STR_ALIEN_ALLOYS");
        fx.base.ledger.storage.add(alloys, 4);
        let rules = manufacture(&registry, "STR_PERSONAL_ARMOR");
        let time = rules.time;
        let index = fx.base.start_production(rules, 2, &mut fx.campaign).unwrap();
        assert_eq!(fx.base.ledger.storage.quantity(alloys), 0);
        fx.base.assign_engineers(index, time + 5).unwrap();

        assert_eq!(fx.step(index), ProductionProgress::BlockedMaterials);
        let p = &fx.base.productions()[index];
        assert_eq!(p.time_spent(), time);
        let armor = item(&registry, "STR_PERSONAL_ARMOR");
        assert_eq!(fx.base.ledger.storage.quantity(armor), 1);
    }

    #[test]
    fn produced_items_land_in_stores() {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 1_000_000);
        let rules = manufacture(&registry, "STR_LASER_RIFLE");
        let time = rules.time;
        let index = fx.base.start_production(rules, 1, &mut fx.campaign).unwrap();
        fx.base.assign_engineers(index, time).unwrap();
        assert_eq!(fx.step(index), ProductionProgress::Complete);
        assert_eq!(fx.base.ledger.storage.quantity(item(&registry, "STR_LASER_RIFLE")), 1);
    }

    #[test]
    fn points_apply_per_unit() {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 1_000_000);
        let mut rule = (*simple_rule("r", 1, 0)).clone();
        rule.points = -3;
        let index = fx.base.start_production(Arc::new(rule), 4, &mut fx.campaign).unwrap();
        fx.base.assign_engineers(index, 4).unwrap();
        assert_eq!(fx.step(index), ProductionProgress::Complete);
        assert_eq!(fx.campaign.research_score(), -12);
    }

    #[test]
    fn refund_returns_cost_and_items() {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 30_000);
        let alloys = item(&registry, "STR_ALIEN_ALLOYS");
        fx.base.ledger.storage.add(alloys, 4);
        let p = Production::new(manufacture(&registry, "STR_PERSONAL_ARMOR"), 1);
        p.refund_item(&mut fx.base.ledger, &mut fx.campaign);
        assert_eq!(fx.campaign.funds(), 52_000);
        assert_eq!(fx.base.ledger.storage.quantity(alloys), 8);
    }
}
