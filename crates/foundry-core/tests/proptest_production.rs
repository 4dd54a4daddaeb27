//! Property-based tests for the production stepper.
//!
//! Generates random rules, funds, stock, and engineer schedules, then checks
//! that every hour of stepping keeps the order's books consistent.

use foundry_core::item::ItemQuantity;
use foundry_core::manufacture::{ManufactureRule, ProductionOutput};
use foundry_core::production::ProductionProgress;
use foundry_core::registry::Registry;
use foundry_core::rng::SimRng;
use foundry_core::test_utils::*;
use proptest::prelude::*;
use std::sync::Arc;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
struct Scenario {
    time: u32,
    cost: i64,
    alloys_per_unit: u32,
    amount: u32,
    funds: i64,
    stock: u32,
    schedule: Vec<u32>,
}

fn arb_scenario() -> impl Strategy<Value = Scenario> {
    (
        1..20u32,
        0..200i64,
        0..3u32,
        1..6u32,
        0..1500i64,
        0..20u32,
        proptest::collection::vec(0..40u32, 1..40),
    )
        .prop_map(|(time, cost, alloys_per_unit, amount, funds, stock, schedule)| Scenario {
            time,
            cost,
            alloys_per_unit,
            amount,
            funds,
            stock,
            schedule,
        })
}

/// Alloys in, armor out.
fn scenario_rule(registry: &Registry, s: &Scenario) -> Arc<ManufactureRule> {
    let alloys = item(registry, "STR_ALIEN_ALLOYS");
    let armor = item(registry, "STR_PERSONAL_ARMOR");
    let required_items = if s.alloys_per_unit > 0 {
        vec![ItemQuantity::new(alloys, s.alloys_per_unit)]
    } else {
        Vec::new()
    };
    Arc::new(ManufactureRule {
        name: "STR_SCENARIO".to_string(),
        cost: s.cost,
        time: s.time,
        required_items,
        output: ProductionOutput::Items(vec![ItemQuantity::new(armor, 1)]),
        ..Default::default()
    })
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Completed units never decrease, whatever the staffing.
    #[test]
    fn units_completed_is_monotonic(s in arb_scenario()) {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, s.funds);
        fx.base.ledger.storage.add(item(&registry, "STR_ALIEN_ALLOYS"), s.stock);
        let Ok(index) = fx.base.start_production(scenario_rule(&registry, &s), s.amount, &mut fx.campaign) else {
            return Ok(());
        };

        let mut last = 0;
        for &engineers in &s.schedule {
            fx.base.assign_engineers(index, engineers).unwrap();
            fx.step(index);
            let now = fx.base.productions()[index].amount_produced();
            prop_assert!(now >= last, "units went from {} to {}", last, now);
            last = now;
        }
    }

    /// Every started unit was paid for exactly once, and every completed
    /// unit delivered its output exactly once.
    #[test]
    fn resources_are_conserved(s in arb_scenario()) {
        let registry = sample_registry();
        let alloys = item(&registry, "STR_ALIEN_ALLOYS");
        let armor = item(&registry, "STR_PERSONAL_ARMOR");
        let mut fx = Fixture::new(&registry, s.funds);
        fx.base.ledger.storage.add(alloys, s.stock);
        let Ok(index) = fx.base.start_production(scenario_rule(&registry, &s), s.amount, &mut fx.campaign) else {
            return Ok(());
        };

        for &engineers in &s.schedule {
            fx.base.assign_engineers(index, engineers).unwrap();
            fx.step(index);

            let p = &fx.base.productions()[index];
            let completed = p.amount_produced().min(s.amount);
            let started = if p.is_finished() || p.awaiting_start() {
                completed
            } else {
                completed + 1
            };
            prop_assert_eq!(fx.campaign.funds(), s.funds - s.cost * started as i64);
            prop_assert_eq!(
                fx.base.ledger.storage.quantity(alloys),
                s.stock - s.alloys_per_unit * started
            );
            prop_assert_eq!(fx.base.ledger.storage.quantity(armor), completed);
            prop_assert!(fx.campaign.funds() >= 0);
        }
    }

    /// Steps with nobody assigned change nothing.
    #[test]
    fn unstaffed_steps_are_idle(s in arb_scenario(), hours in 1..20usize) {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, s.funds);
        fx.base.ledger.storage.add(item(&registry, "STR_ALIEN_ALLOYS"), s.stock);
        let Ok(index) = fx.base.start_production(scenario_rule(&registry, &s), s.amount, &mut fx.campaign) else {
            return Ok(());
        };
        let funds = fx.campaign.funds();
        let stock = fx.base.ledger.storage.clone();

        for _ in 0..hours {
            prop_assert_eq!(fx.step(index), ProductionProgress::NotComplete);
        }
        prop_assert_eq!(fx.base.productions()[index].time_spent(), 0);
        prop_assert_eq!(fx.campaign.funds(), funds);
        prop_assert_eq!(&fx.base.ledger.storage, &stock);
    }

    /// Once complete, an order stays complete and inert.
    #[test]
    fn completion_is_terminal(s in arb_scenario()) {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 1_000_000);
        fx.base.ledger.storage.add(item(&registry, "STR_ALIEN_ALLOYS"), 1000);
        let index = fx
            .base
            .start_production(scenario_rule(&registry, &s), s.amount, &mut fx.campaign)
            .unwrap();
        fx.base.assign_engineers(index, s.time).unwrap();

        while fx.step(index) != ProductionProgress::Complete {}
        let funds = fx.campaign.funds();
        let stock = fx.base.ledger.storage.clone();
        let spent = fx.base.productions()[index].time_spent();

        for &engineers in &s.schedule {
            fx.base.assign_engineers(index, engineers).unwrap();
            prop_assert_eq!(fx.step(index), ProductionProgress::Complete);
        }
        prop_assert_eq!(fx.campaign.funds(), funds);
        prop_assert_eq!(&fx.base.ledger.storage, &stock);
        prop_assert_eq!(fx.base.productions()[index].time_spent(), spent);
        prop_assert_eq!(fx.base.ledger.storage.quantity(item(&registry, "STR_PERSONAL_ARMOR")), s.amount);
    }

    /// The reward tally always matches what was put in stores.
    #[test]
    fn reward_tally_matches_stock(seed in any::<u64>(), amount in 1..30u32, engineers in 1..60u32) {
        let registry = sample_registry();
        let mut fx = Fixture::new(&registry, 1_000_000).with_rng(SimRng::new(seed));
        let index = fx
            .base
            .start_production(manufacture(&registry, "STR_SALVAGE_ANALYSIS"), amount, &mut fx.campaign)
            .unwrap();
        fx.base.assign_engineers(index, engineers).unwrap();

        while fx.step(index) != ProductionProgress::Complete {}
        let tally = fx.base.productions()[index].random_production_info();
        let total: u32 = tally.values().sum();
        // Every reward set in the salvage table holds two items.
        prop_assert_eq!(total, amount * 2);
        for (name, &count) in tally {
            prop_assert_eq!(fx.base.ledger.storage.quantity(item(&registry, name)), count);
        }
    }
}
