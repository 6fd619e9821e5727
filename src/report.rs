//! Reports

use std::io;

use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    allocation::{OptimizationResult, RewardMode},
    catalog::Catalog,
    sweep::Sweep,
};

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The allocation refers to a price-point the catalog does not have.
    #[error("price-point {0} missing from catalog")]
    MissingPrice(u64),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Write one optimisation result as a table: a row per price-point plus a total row.
///
/// # Errors
///
/// Returns a [`ReportError`] if a price-point is missing from the catalog or
/// writing fails.
pub fn allocation_table(
    mut out: impl io::Write,
    result: &OptimizationResult,
    catalog: &Catalog,
) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Price", "Units", "Bonus Units", "Reward"]);

    for purchase in result.allocation.iter() {
        let entry = catalog
            .get(purchase.price)
            .ok_or(ReportError::MissingPrice(purchase.price))?;

        builder.push_record([
            purchase.price.to_string(),
            purchase.units.to_string(),
            purchase.bonus_units.to_string(),
            purchase.reward(entry).to_string(),
        ]);
    }

    builder.push_record([
        result.allocation.spend().to_string(),
        result.allocation.total_units().to_string(),
        String::new(),
        result.total_reward.to_string(),
    ]);

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(..), Alignment::right());

    writeln!(out, "{} mode", mode_label(result.mode))?;
    writeln!(out, "{table}")?;

    Ok(())
}

/// Write sweeps side by side, one row per budget.
///
/// Budgets skipped by a sweep are left blank in that sweep's columns.
///
/// # Errors
///
/// Returns a [`ReportError`] if writing fails.
pub fn sweep_table(mut out: impl io::Write, sweeps: &[&Sweep]) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    let mut header = vec!["Budget".to_string()];

    for sweep in sweeps {
        let label = mode_label(sweep.mode);

        header.push(format!("{label} Reward"));
        header.push(format!("{label} Reward/Unit"));
    }

    builder.push_record(header);

    let mut budgets: SmallVec<[u64; 64]> = sweeps
        .iter()
        .flat_map(|sweep| sweep.points.iter().map(|point| point.budget))
        .collect();

    budgets.sort_unstable();
    budgets.dedup();

    for budget in budgets {
        let mut row = vec![budget.to_string()];

        for sweep in sweeps {
            match sweep.point(budget) {
                Some(point) => {
                    row.push(point.total_reward.to_string());
                    row.push(point.reward_per_unit.to_string());
                }
                None => {
                    row.push(String::new());
                    row.push(String::new());
                }
            }
        }

        builder.push_record(row);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(..), Alignment::right());
    table.modify(Rows::first(), Alignment::center());

    writeln!(out, "{table}")?;

    for sweep in sweeps {
        if let Some(best) = sweep.best_ratio() {
            writeln!(
                out,
                "{}: best reward/unit {} at budget {}",
                mode_label(sweep.mode),
                best.reward_per_unit,
                best.budget
            )?;
        }

        if !sweep.skipped.is_empty() {
            writeln!(
                out,
                "{}: skipped budgets {:?}",
                mode_label(sweep.mode),
                sweep.skipped.as_slice()
            )?;
        }
    }

    Ok(())
}

fn mode_label(mode: RewardMode) -> &'static str {
    match mode {
        RewardMode::Standard => "Standard",
        RewardMode::FirstTimeBonus => "First-Time Bonus",
    }
}
