//! Integration tests for concrete allocation scenarios through the ILP optimizer.

use rust_decimal::Decimal;
use testresult::TestResult;

use topup::{
    allocation::RewardMode,
    budget::Budget,
    catalog::{Catalog, CatalogEntry},
    fixtures::Fixtures,
    solvers::{ErrorKind, Optimizer, SolverError, ilp::ILPOptimizer},
};

fn two_pack() -> TestResult<Catalog> {
    Ok(Fixtures::new().load_catalog("two_pack")?.catalog)
}

fn genshin() -> TestResult<Catalog> {
    Ok(Fixtures::new().load_catalog("genshin")?.catalog)
}

#[test]
fn no_bonus_buys_one_of_each_pack_for_twenty() -> TestResult {
    let result = ILPOptimizer::new().optimize(Budget::from(20_i64), false, &two_pack()?)?;

    // 1090 + 330 beats four 5-packs (1320)
    assert_eq!(result.total_reward, 1420);
    assert_eq!(result.allocation.count(5), Some(1));
    assert_eq!(result.allocation.count(15), Some(1));
    assert_eq!(result.mode, RewardMode::Standard);

    Ok(())
}

#[test]
fn bonus_buys_both_first_time_packs_for_twenty() -> TestResult {
    let result = ILPOptimizer::new().optimize(Budget::from(20_i64), true, &two_pack()?)?;

    // 600 + 1960
    assert_eq!(result.total_reward, 2560);
    assert_eq!(result.allocation.count(5), Some(1));
    assert_eq!(result.allocation.count(15), Some(1));
    assert_eq!(result.allocation.spend(), 20);

    Ok(())
}

#[test]
fn bonus_mode_mixes_bonus_and_regular_units() -> TestResult {
    let result = ILPOptimizer::new().optimize_with_bonus(Budget::from(4_i64), &genshin()?)?;

    // One bonus 1-pack (120) and three regular 1-packs (3 * 60)
    assert_eq!(result.total_reward, 300);

    let purchase = result.allocation.get(1).ok_or("missing 1 price-point")?;

    assert_eq!(purchase.units, 4);
    assert_eq!(purchase.bonus_units, 1);
    assert_eq!(purchase.regular_units(), 3);

    Ok(())
}

#[test]
fn genshin_totals_match_known_optima() -> TestResult {
    let catalog = genshin()?;
    let optimizer = ILPOptimizer::new();

    let cases: [(i64, u64, u64); 8] = [
        (1, 60, 120),
        (5, 330, 600),
        (6, 390, 720),
        (21, 1480, 2680),
        (50, 3880, 6560),
        (100, 8080, 13080),
        (150, 11960, 19520),
        (200, 16160, 26040),
    ];

    for (budget, standard, bonus) in cases {
        let budget = Budget::from(budget);

        assert_eq!(
            optimizer.optimize_no_bonus(budget, &catalog)?.total_reward,
            standard,
            "standard reward at {budget}"
        );
        assert_eq!(
            optimizer.optimize_with_bonus(budget, &catalog)?.total_reward,
            bonus,
            "bonus reward at {budget}"
        );
    }

    Ok(())
}

/// Best standard reward for every budget `0..=max`, by unbounded knapsack.
fn exhaustive_standard_rewards(catalog: &Catalog, max: u64) -> Vec<u64> {
    let mut best: Vec<u64> = Vec::new();

    for budget in 0..=max {
        let reward = catalog
            .iter()
            .filter(|entry| entry.price <= budget)
            .filter_map(|entry| {
                let rest = usize::try_from(budget - entry.price).ok()?;

                best.get(rest).map(|reward| reward + entry.base_reward)
            })
            .max()
            .unwrap_or(0);

        best.push(reward);
    }

    best
}

/// Best first-time bonus reward for every budget `0..=max`.
///
/// Tries every subset of bonus units and fills the remaining budget with the
/// best standard purchase.
fn exhaustive_bonus_rewards(catalog: &Catalog, standard: &[u64]) -> TestResult<Vec<u64>> {
    let entries: Vec<&CatalogEntry> = catalog.iter().collect();
    let subsets = 1_u32 << u32::try_from(entries.len())?;

    let bonus_sets: Vec<(u64, u64)> = (0..subsets)
        .map(|mask| {
            entries
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .fold((0, 0), |(cost, reward), (_, entry)| {
                    (cost + entry.price, reward + entry.bonus_reward)
                })
        })
        .collect();

    let best = (0_u64..)
        .take(standard.len())
        .map(|budget| {
            bonus_sets
                .iter()
                .filter(|(cost, _)| *cost <= budget)
                .filter_map(|(cost, reward)| {
                    let rest = usize::try_from(budget - cost).ok()?;

                    standard.get(rest).map(|fill| reward + fill)
                })
                .max()
                .unwrap_or(0)
        })
        .collect();

    Ok(best)
}

#[test]
fn genshin_totals_match_exhaustive_search() -> TestResult {
    let catalog = genshin()?;
    let optimizer = ILPOptimizer::new();

    let standard = exhaustive_standard_rewards(&catalog, 60);
    let bonus = exhaustive_bonus_rewards(&catalog, &standard)?;

    for ((budget, expected_standard), expected_bonus) in (0_u64..).zip(&standard).zip(&bonus) {
        let budget = Budget::from(budget);

        assert_eq!(
            optimizer.optimize_no_bonus(budget, &catalog)?.total_reward,
            *expected_standard,
            "standard reward at {budget}"
        );
        assert_eq!(
            optimizer.optimize_with_bonus(budget, &catalog)?.total_reward,
            *expected_bonus,
            "bonus reward at {budget}"
        );
    }

    Ok(())
}

#[test]
fn exhaustive_search_agrees_with_known_optima() -> TestResult {
    let catalog = genshin()?;

    let standard = exhaustive_standard_rewards(&catalog, 21);
    let bonus = exhaustive_bonus_rewards(&catalog, &standard)?;

    assert_eq!(standard.get(21), Some(&1480));
    assert_eq!(bonus.get(21), Some(&2680));
    assert_eq!(bonus.get(6), Some(&720));

    Ok(())
}

#[test]
fn fractional_budget_behaves_like_its_whole_part() -> TestResult {
    let catalog = genshin()?;
    let optimizer = ILPOptimizer::new();

    let fractional = optimizer.optimize_with_bonus(Budget::new(Decimal::new(2199, 2)), &catalog)?;
    let whole = optimizer.optimize_with_bonus(Budget::from(21_i64), &catalog)?;

    assert_eq!(fractional.total_reward, whole.total_reward);

    Ok(())
}

#[test]
fn zero_budget_buys_nothing_in_either_mode() -> TestResult {
    let catalog = genshin()?;

    for bonus_enabled in [false, true] {
        let result = ILPOptimizer::new().optimize(Budget::from(0_i64), bonus_enabled, &catalog)?;

        assert_eq!(result.total_reward, 0);
        assert_eq!(result.allocation.len(), catalog.len());
        assert!(result.allocation.counts().all(|(_, units)| units == 0));
    }

    Ok(())
}

#[test]
fn negative_budget_is_rejected_in_either_mode() -> TestResult {
    let catalog = two_pack()?;

    for bonus_enabled in [false, true] {
        let result = ILPOptimizer::new().optimize(Budget::from(-1_i64), bonus_enabled, &catalog);

        let Err(error) = result else {
            panic!("expected negative budget to be rejected")
        };

        assert!(matches!(error, SolverError::NegativeBudget { .. }));
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }

    Ok(())
}

#[test]
fn empty_catalog_is_rejected_in_either_mode() {
    for bonus_enabled in [false, true] {
        let result = ILPOptimizer::new().optimize(Budget::from(20_i64), bonus_enabled, &Catalog::default());

        assert!(matches!(result, Err(SolverError::EmptyCatalog)));
    }
}

#[test]
fn equal_ratio_catalog_only_fixes_total_reward() -> TestResult {
    // Both packs pay 10 per unit spent, so many allocations are optimal.
    let catalog = Catalog::new([
        CatalogEntry::new(2, 20, 30),
        CatalogEntry::new(4, 40, 50),
    ])?;

    let result = ILPOptimizer::new().optimize_no_bonus(Budget::from(12_i64), &catalog)?;

    assert_eq!(result.total_reward, 120);
    assert_eq!(result.allocation.spend(), 12);

    Ok(())
}
