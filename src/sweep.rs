//! Budget Sweeps
//!
//! Repeats an optimisation across an arithmetic range of budgets and derives the
//! reward earned per budget unit at each point.

use rust_decimal::Decimal;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    allocation::RewardMode,
    budget::Budget,
    catalog::Catalog,
    solvers::{Optimizer, SolverError},
};

/// Decimal places kept for reward-per-unit ratios
pub const RATIO_DECIMAL_PLACES: u32 = 3;

/// Sweep Errors
#[derive(Debug, Error)]
pub enum SweepError {
    /// The range cannot be iterated.
    #[error("invalid budget range {start}..{end} step {step}")]
    InvalidRange {
        /// First budget
        start: u64,

        /// Exclusive upper bound
        end: u64,

        /// Increment
        step: u64,
    },

    /// An optimisation failed and the sweep was configured to abort.
    #[error("optimisation failed at budget {budget}: {source}")]
    Optimization {
        /// Budget that failed
        budget: u64,

        /// Underlying solver error
        #[source]
        source: SolverError,
    },
}

/// What to do when a single budget fails to optimise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFailure {
    /// Stop the sweep and return the error
    #[default]
    Abort,

    /// Log the error, record the budget as skipped and carry on
    Skip,
}

/// Budgets `start, start + step, ...` strictly below `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetRange {
    start: u64,
    end: u64,
    step: u64,
}

impl BudgetRange {
    /// Creates a new range
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::InvalidRange`] if `step` is zero.
    pub fn new(start: u64, end: u64, step: u64) -> Result<Self, SweepError> {
        if step == 0 {
            return Err(SweepError::InvalidRange { start, end, step });
        }

        Ok(Self { start, end, step })
    }

    /// Iterate the budgets in the range
    pub fn budgets(&self) -> impl Iterator<Item = u64> + use<> {
        let Self { start, end, step } = *self;

        (start..end).step_by(usize::try_from(step).unwrap_or(usize::MAX))
    }

    /// Number of budgets in the range
    pub fn len(&self) -> usize {
        self.budgets().count()
    }

    /// Whether the range yields no budgets
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl Default for BudgetRange {
    fn default() -> Self {
        Self {
            start: 5,
            end: 2000,
            step: 5,
        }
    }
}

/// Result of optimising a single budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPoint {
    /// Budget optimised
    pub budget: u64,

    /// Best achievable reward
    pub total_reward: u64,

    /// Reward per budget unit, rounded to [`RATIO_DECIMAL_PLACES`]
    pub reward_per_unit: Decimal,
}

impl SweepPoint {
    /// Build a point, deriving the reward-per-unit ratio
    pub fn new(budget: u64, total_reward: u64) -> Self {
        let reward_per_unit = if budget == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(total_reward) / Decimal::from(budget))
                .round_dp(RATIO_DECIMAL_PLACES)
                .normalize()
        };

        Self {
            budget,
            total_reward,
            reward_per_unit,
        }
    }
}

/// Points from one sweep, in budget order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sweep {
    /// Mode every point was optimised for
    pub mode: RewardMode,

    /// Successful points
    pub points: Vec<SweepPoint>,

    /// Budgets that failed and were skipped
    pub skipped: SmallVec<[u64; 4]>,
}

impl Sweep {
    /// Point for a given budget, if it was optimised successfully
    pub fn point(&self, budget: u64) -> Option<&SweepPoint> {
        self.points
            .binary_search_by_key(&budget, |point| point.budget)
            .ok()
            .and_then(|idx| self.points.get(idx))
    }

    /// Point with the highest reward per unit; the smallest budget wins ties.
    pub fn best_ratio(&self) -> Option<&SweepPoint> {
        self.points.iter().reduce(|best, point| {
            if point.reward_per_unit > best.reward_per_unit {
                point
            } else {
                best
            }
        })
    }
}

/// Optimise every budget in `range`.
///
/// Each budget is an independent call; nothing is shared between calls except the
/// read-only catalog.
///
/// # Errors
///
/// Returns [`SweepError::Optimization`] for the first failing budget when
/// `on_failure` is [`OnFailure::Abort`].
pub fn sweep<O: Optimizer + ?Sized>(
    optimizer: &O,
    catalog: &Catalog,
    range: BudgetRange,
    mode: RewardMode,
    on_failure: OnFailure,
) -> Result<Sweep, SweepError> {
    let mut points = Vec::with_capacity(range.len());
    let mut skipped = SmallVec::new();

    for budget in range.budgets() {
        match optimizer.optimize_mode(Budget::from(budget), mode, catalog) {
            Ok(result) => points.push(SweepPoint::new(budget, result.total_reward)),
            Err(source) => match on_failure {
                OnFailure::Abort => return Err(SweepError::Optimization { budget, source }),
                OnFailure::Skip => {
                    warn!(budget, ?mode, error = %source, "skipping budget");

                    skipped.push(budget);
                }
            },
        }
    }

    info!(
        ?mode,
        points = points.len(),
        skipped = skipped.len(),
        "sweep complete"
    );

    Ok(Sweep {
        mode,
        points,
        skipped,
    })
}
