//! Random reward selection for manufacture with a weighted outcome table.
//!
//! Every completed unit draws `roll` uniformly from `[1, total_weight]` and
//! takes the first outcome whose running weight reaches the roll. Weights
//! are positive, so running sums are strictly increasing and the choice is
//! unique for a given roll.

use crate::manufacture::RandomOutcome;
use crate::rng::RandomSource;

/// Sum of all outcome weights.
pub fn total_weight(table: &[RandomOutcome]) -> u64 {
    table.iter().map(|o| o.weight as u64).sum()
}

/// The first outcome whose cumulative weight is `>= roll`.
///
/// Returns `None` for an empty table or a roll past the total weight.
pub fn select_outcome(table: &[RandomOutcome], roll: u64) -> Option<&RandomOutcome> {
    let mut running = 0u64;
    table.iter().find(|outcome| {
        running += outcome.weight as u64;
        running >= roll
    })
}

/// Draw a roll from `rng` and select an outcome.
pub fn roll_outcome<'a>(
    table: &'a [RandomOutcome],
    rng: &mut dyn RandomSource,
) -> Option<&'a RandomOutcome> {
    let total = total_weight(table);
    if total == 0 {
        return None;
    }
    let roll = rng.generate(1, total as i64) as u64;
    select_outcome(table, roll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ItemTypeId;
    use crate::item::ItemQuantity;
    use crate::test_utils::ScriptedRng;

    fn table() -> Vec<RandomOutcome> {
        vec![
            RandomOutcome {
                weight: 3,
                items: vec![ItemQuantity::new(ItemTypeId(0), 1)],
            },
            RandomOutcome {
                weight: 1,
                items: vec![ItemQuantity::new(ItemTypeId(1), 2)],
            },
            RandomOutcome {
                weight: 6,
                items: vec![
                    ItemQuantity::new(ItemTypeId(2), 1),
                    ItemQuantity::new(ItemTypeId(3), 1),
                ],
            },
        ]
    }

    #[test]
    fn total_weight_sums() {
        assert_eq!(total_weight(&table()), 10);
        assert_eq!(total_weight(&[]), 0);
    }

    #[test]
    fn boundaries_select_by_prefix_sum() {
        let t = table();
        assert_eq!(select_outcome(&t, 1).unwrap().weight, 3);
        assert_eq!(select_outcome(&t, 3).unwrap().weight, 3);
        assert_eq!(select_outcome(&t, 4).unwrap().weight, 1);
        assert_eq!(select_outcome(&t, 5).unwrap().weight, 6);
        assert_eq!(select_outcome(&t, 10).unwrap().weight, 6);
    }

    #[test]
    fn roll_past_total_selects_nothing() {
        assert!(select_outcome(&table(), 11).is_none());
    }

    #[test]
    fn empty_table_never_rolls() {
        let mut rng = ScriptedRng::new(vec![]);
        assert!(roll_outcome(&[], &mut rng).is_none());
        assert_eq!(rng.calls(), 0);
    }

    #[test]
    fn roll_uses_full_weight_range() {
        let t = table();
        let mut rng = ScriptedRng::new(vec![4]);
        let outcome = roll_outcome(&t, &mut rng).unwrap();
        assert_eq!(outcome.items[0].item_type, ItemTypeId(1));
        assert_eq!(rng.last_range(), Some((1, 10)));
    }

    #[test]
    fn same_roll_same_outcome() {
        let t = table();
        for roll in 1..=10 {
            assert_eq!(select_outcome(&t, roll), select_outcome(&t, roll));
        }
    }
}
