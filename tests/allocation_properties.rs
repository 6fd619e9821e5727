//! Properties that must hold for every budget, checked across a range of budgets.

use testresult::TestResult;

use topup::{
    allocation::{OptimizationResult, RewardMode},
    budget::Budget,
    catalog::Catalog,
    fixtures::Fixtures,
    solvers::{Optimizer, ilp::ILPOptimizer},
    sweep::{BudgetRange, OnFailure, sweep},
};

const MAX_BUDGET: u64 = 60;

fn results(catalog: &Catalog, mode: RewardMode) -> TestResult<Vec<(u64, OptimizationResult)>> {
    let optimizer = ILPOptimizer::new();

    (0..=MAX_BUDGET)
        .map(|budget| {
            let result = optimizer.optimize_mode(Budget::from(budget), mode, catalog)?;

            Ok((budget, result))
        })
        .collect()
}

fn genshin() -> TestResult<Catalog> {
    Ok(Fixtures::new().load_catalog("genshin")?.catalog)
}

#[test]
fn more_budget_never_lowers_the_reward() -> TestResult {
    let catalog = genshin()?;

    for mode in [RewardMode::Standard, RewardMode::FirstTimeBonus] {
        let results = results(&catalog, mode)?;

        for pair in results.windows(2) {
            let [(low, low_result), (high, high_result)] = pair else {
                continue;
            };

            assert!(
                low_result.total_reward <= high_result.total_reward,
                "{mode:?}: reward at {low} exceeds reward at {high}"
            );
        }
    }

    Ok(())
}

#[test]
fn allocations_never_exceed_the_budget() -> TestResult {
    let catalog = genshin()?;

    for mode in [RewardMode::Standard, RewardMode::FirstTimeBonus] {
        for (budget, result) in results(&catalog, mode)? {
            assert!(
                result.allocation.spend() <= budget,
                "{mode:?}: spent {} of {budget}",
                result.allocation.spend()
            );
        }
    }

    Ok(())
}

#[test]
fn bonus_reward_is_at_least_the_standard_reward() -> TestResult {
    let catalog = genshin()?;

    let standard = results(&catalog, RewardMode::Standard)?;
    let bonus = results(&catalog, RewardMode::FirstTimeBonus)?;

    for ((budget, standard), (_, bonus)) in standard.iter().zip(&bonus) {
        assert!(
            bonus.total_reward >= standard.total_reward,
            "bonus reward below standard reward at {budget}"
        );
    }

    Ok(())
}

#[test]
fn bonus_rewards_match_first_time_reconstruction() -> TestResult {
    let catalog = genshin()?;

    for (budget, result) in results(&catalog, RewardMode::FirstTimeBonus)? {
        let mut reconstructed = 0;

        for purchase in result.allocation.iter() {
            let entry = catalog.get(purchase.price).ok_or("missing price-point")?;

            // Bonus units are worth more than regular ones, so any price-point
            // bought from takes its bonus unit at the optimum.
            assert_eq!(
                purchase.bonus_units,
                u64::from(purchase.units > 0),
                "bonus unit at {} for budget {budget}",
                purchase.price
            );
            assert_eq!(purchase.reward(entry), entry.first_time_reward(purchase.units));

            reconstructed += entry.first_time_reward(purchase.units);
        }

        assert_eq!(reconstructed, result.total_reward, "total at {budget}");
    }

    Ok(())
}

#[test]
fn standard_allocations_never_take_bonus_units() -> TestResult {
    let catalog = genshin()?;

    for (budget, result) in results(&catalog, RewardMode::Standard)? {
        let reconstructed: u64 = result
            .allocation
            .iter()
            .filter_map(|purchase| {
                catalog
                    .get(purchase.price)
                    .map(|entry| entry.standard_reward(purchase.units))
            })
            .sum();

        assert!(result.allocation.iter().all(|p| p.bonus_units == 0));
        assert_eq!(reconstructed, result.total_reward, "total at {budget}");
    }

    Ok(())
}

#[test]
fn sweep_agrees_with_individual_optimisations() -> TestResult {
    let catalog = genshin()?;
    let optimizer = ILPOptimizer::new();

    let sweep = sweep(
        &optimizer,
        &catalog,
        BudgetRange::new(5, 50, 5)?,
        RewardMode::FirstTimeBonus,
        OnFailure::Abort,
    )?;

    assert_eq!(sweep.points.len(), 9);

    for point in &sweep.points {
        let single = optimizer.optimize_with_bonus(Budget::from(point.budget), &catalog)?;

        assert_eq!(point.total_reward, single.total_reward);
    }

    Ok(())
}
