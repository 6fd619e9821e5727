//! ILP Optimizer

use std::time::{Duration, Instant};

use good_lp::{
    Expression, ResolutionError, Solution, SolutionStatus, SolverModel, WithTimeLimit,
};
use num_traits::ToPrimitive;
use tracing::debug;

#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs as default_solver;
#[cfg(all(not(feature = "solver-highs"), feature = "solver-microlp"))]
use good_lp::solvers::microlp::microlp as default_solver;

use crate::{
    allocation::{Allocation, OptimizationResult, Purchase, RewardMode},
    budget::Budget,
    catalog::Catalog,
    solvers::{
        Optimizer, SolverError,
        ilp::state::{ILPConstraint, PriceVars},
    },
};

pub mod observer;
pub(crate) mod state;

pub use observer::{ILPObserver, NoopObserver, TracingObserver};
pub use state::ConstraintRelation;
pub(crate) use state::ILPState;

/// Distance from an integer within which a solver value is snapped to it
pub const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Largest gap tolerated between the decoded reward and the solver's objective value
const OBJECTIVE_TOLERANCE: f64 = 0.5;

/// Optimizer using Integer Linear Programming (ILP)
#[derive(Debug, Clone, Default)]
pub struct ILPOptimizer {
    time_limit: Option<Duration>,
}

impl ILPOptimizer {
    /// Optimizer without a time budget
    pub fn new() -> Self {
        Self::default()
    }

    /// Optimizer that treats any solve slower than `limit` as a failure
    pub fn with_time_limit(limit: Duration) -> Self {
        Self {
            time_limit: Some(limit),
        }
    }

    /// Configured time budget, if any
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Optimise with an observer for capturing the ILP formulation.
    ///
    /// The observer receives callbacks for every variable, objective term and
    /// constraint as the model is built.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] if the input is invalid or the solver fails.
    pub fn optimize_with_observer<O: ILPObserver + ?Sized>(
        &self,
        budget: Budget,
        mode: RewardMode,
        catalog: &Catalog,
        observer: &mut O,
    ) -> Result<OptimizationResult, SolverError> {
        let spendable = validate_input(budget, catalog)?;

        // Return early if not even the cheapest price-point is affordable
        if catalog
            .cheapest()
            .is_none_or(|entry| entry.price > spendable)
        {
            debug!(%budget, ?mode, "budget below cheapest price-point");

            return Ok(OptimizationResult::empty(mode, catalog));
        }

        let rhs = u64_to_f64_exact(spendable).ok_or(SolverError::BudgetNotRepresentable {
            budget: *budget,
        })?;

        let start = Instant::now();

        // Decision variables per price-point: a non-negative integer count of units
        // earning the base reward, plus (bonus mode only) a binary first-time unit.
        let mut state = ILPState::with_catalog_and_observer(catalog, mode, observer)?;

        // Every unit costs its price-point, whether or not it is the bonus unit.
        let spend = price_vars_expression(state.price_vars(), |vars| {
            let mut expr = vars.count * vars.price_coeff;

            if let Some(bonus) = vars.bonus {
                expr += bonus * vars.price_coeff;
            }

            expr
        });

        state.add_leq_constraint("budget", spend, rhs);

        // Redundant given non-negative counts.
        let units = price_vars_expression(state.price_vars(), |vars| Expression::from(vars.count));

        state.add_geq_constraint("total_units", units, 0.0);

        let bonus_vars: Vec<_> = state
            .price_vars()
            .iter()
            .filter_map(|vars| vars.bonus)
            .collect();

        for bonus in bonus_vars {
            state.add_geq_constraint("bonus_lower", Expression::from(bonus), 0.0);
            state.add_leq_constraint("bonus_upper", Expression::from(bonus), 1.0);
        }

        let (pb, reward, price_vars, constraints) = state.into_parts();

        let objective = reward.clone();
        let mut model = pb.maximise(reward).using(default_solver);

        model = apply_recorded_constraints(model, constraints, observer);

        if let Some(limit) = self.time_limit {
            model = model.with_time_limit(limit.as_secs_f64());
        }

        let outcome = model.solve();
        let elapsed = start.elapsed();

        let solution = within_time_budget(outcome, elapsed, self.time_limit)?;

        let allocation = decode_allocation(&solution, &price_vars)?;

        if allocation.spend() > spendable {
            return Err(SolverError::InvariantViolation {
                message: "decoded allocation exceeds the budget",
            });
        }

        let total_reward = total_reward(&allocation, catalog)?;

        ensure_matches_objective(total_reward, solution.eval(&objective))?;

        debug!(
            %budget,
            ?mode,
            total_reward,
            spend = allocation.spend(),
            elapsed = ?elapsed,
            "optimised allocation"
        );

        Ok(OptimizationResult {
            mode,
            total_reward,
            allocation,
        })
    }
}

impl Optimizer for ILPOptimizer {
    fn optimize_no_bonus(
        &self,
        budget: Budget,
        catalog: &Catalog,
    ) -> Result<OptimizationResult, SolverError> {
        self.optimize_with_observer(budget, RewardMode::Standard, catalog, &mut NoopObserver)
    }

    fn optimize_with_bonus(
        &self,
        budget: Budget,
        catalog: &Catalog,
    ) -> Result<OptimizationResult, SolverError> {
        self.optimize_with_observer(
            budget,
            RewardMode::FirstTimeBonus,
            catalog,
            &mut NoopObserver,
        )
    }
}

/// Reject invalid input before any model is built, returning the spendable whole units.
fn validate_input(budget: Budget, catalog: &Catalog) -> Result<u64, SolverError> {
    if budget.is_negative() {
        return Err(SolverError::NegativeBudget { budget: *budget });
    }

    if catalog.is_empty() {
        return Err(SolverError::EmptyCatalog);
    }

    for entry in catalog {
        if entry.price == 0 {
            return Err(SolverError::NonPositivePrice);
        }

        if entry.base_reward == 0 || entry.bonus_reward == 0 {
            return Err(SolverError::NonPositiveReward { price: entry.price });
        }
    }

    budget
        .spendable_units()
        .ok_or(SolverError::BudgetNotRepresentable { budget: *budget })
}

fn price_vars_expression(
    price_vars: &[PriceVars],
    term: impl Fn(&PriceVars) -> Expression,
) -> Expression {
    price_vars
        .iter()
        .fold(Expression::default(), |acc, vars| acc + term(vars))
}

fn apply_recorded_constraints<S: SolverModel, O: ILPObserver + ?Sized>(
    mut model: S,
    constraints: Vec<ILPConstraint>,
    observer: &mut O,
) -> S {
    for constraint in constraints {
        observer.on_constraint(
            constraint.name,
            &constraint.lhs,
            constraint.relation,
            constraint.rhs,
        );

        model = match constraint.relation {
            ConstraintRelation::Leq => model.with(constraint.lhs.leq(constraint.rhs)),
            ConstraintRelation::Geq => model.with(constraint.lhs.geq(constraint.rhs)),
        };
    }

    model
}

/// Accept a solve outcome only if it finished inside the time budget.
///
/// The backend is handed the limit and stops once it passes, either with an error
/// (no solution found yet) or with a [`SolutionStatus::TimeLimit`] solution that
/// may not be optimal. Both count as [`SolverError::TimeBudgetExceeded`].
fn within_time_budget<S: Solution>(
    outcome: Result<S, ResolutionError>,
    elapsed: Duration,
    limit: Option<Duration>,
) -> Result<S, SolverError> {
    let Some(limit) = limit else {
        return outcome.map_err(SolverError::from);
    };

    match outcome {
        Err(_) if elapsed >= limit => Err(SolverError::TimeBudgetExceeded { elapsed, limit }),
        Err(error) => Err(error.into()),
        Ok(solution)
            if matches!(solution.status(), SolutionStatus::TimeLimit) || elapsed > limit =>
        {
            Err(SolverError::TimeBudgetExceeded { elapsed, limit })
        }
        Ok(solution) => Ok(solution),
    }
}

/// Translate the solver's variable values back into purchase counts.
///
/// Values are read through the per-price variable handles. Each price-point's
/// total is its regular units plus its bonus unit, if bought.
///
/// # Errors
///
/// Returns [`SolverError::NonIntegralValue`] if a value is not within
/// [`INTEGRALITY_TOLERANCE`] of a valid integer (or, for bonus flags, of 0 or 1).
fn decode_allocation(
    solution: &impl Solution,
    price_vars: &[PriceVars],
) -> Result<Allocation, SolverError> {
    price_vars
        .iter()
        .map(|vars| {
            let regular = integral_value(solution.value(vars.count), vars.price)?;

            let bonus_units = match vars.bonus {
                Some(var) => bonus_flag(solution.value(var), vars.price)?,
                None => 0,
            };

            Ok(Purchase {
                price: vars.price,
                units: regular.saturating_add(bonus_units),
                bonus_units,
            })
        })
        .collect()
}

/// Snap a solver value to a non-negative integer.
fn integral_value(value: f64, price: u64) -> Result<u64, SolverError> {
    let rounded = value.round();

    if (value - rounded).abs() > INTEGRALITY_TOLERANCE {
        return Err(SolverError::NonIntegralValue { price, value });
    }

    rounded
        .to_u64()
        .ok_or(SolverError::NonIntegralValue { price, value })
}

/// Snap a solver value to a bonus flag (0 or 1).
fn bonus_flag(value: f64, price: u64) -> Result<u64, SolverError> {
    match integral_value(value, price)? {
        flag @ (0 | 1) => Ok(flag),
        _ => Err(SolverError::NonIntegralValue { price, value }),
    }
}

/// Sum the reward of every purchase in the allocation.
fn total_reward(allocation: &Allocation, catalog: &Catalog) -> Result<u64, SolverError> {
    allocation.iter().try_fold(0_u64, |acc, purchase| {
        let entry = catalog
            .get(purchase.price)
            .ok_or(SolverError::InvariantViolation {
                message: "decoded price-point missing from catalog",
            })?;

        acc.checked_add(purchase.reward(entry))
            .ok_or(SolverError::InvariantViolation {
                message: "total reward overflows u64",
            })
    })
}

/// Ensure the reward rebuilt from the allocation agrees with the solver's objective.
fn ensure_matches_objective(total_reward: u64, objective_value: f64) -> Result<(), SolverError> {
    let decoded = total_reward
        .to_f64()
        .ok_or(SolverError::InvariantViolation {
            message: "total reward cannot be compared with the objective",
        })?;

    if (decoded - objective_value).abs() > OBJECTIVE_TOLERANCE {
        return Err(SolverError::InvariantViolation {
            message: "decoded reward does not match the solver objective",
        });
    }

    Ok(())
}

/// Convert a `u64` to an `f64` if it can be represented exactly.
pub fn u64_to_f64_exact(v: u64) -> Option<f64> {
    let f = v.to_f64()?;

    (f.to_u64() == Some(v)).then_some(f)
}
