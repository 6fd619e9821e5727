//! Solvers for budget allocation

use std::time::Duration;

use good_lp::ResolutionError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    allocation::{OptimizationResult, RewardMode},
    budget::Budget,
    catalog::Catalog,
};

pub mod ilp;

/// Broad classification of a [`SolverError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The budget or catalog was rejected before any model was built
    InvalidInput,

    /// The solver, or decoding its answer, failed
    SolverFailure,
}

/// Solver Errors
#[derive(Debug, Error)]
pub enum SolverError {
    /// Budget is below zero.
    #[error("budget must not be negative: {budget}")]
    NegativeBudget {
        /// Offending budget
        budget: Decimal,
    },

    /// Budget is too large to be used as a solver coefficient.
    #[error("budget cannot be represented exactly as a solver coefficient: {budget}")]
    BudgetNotRepresentable {
        /// Offending budget
        budget: Decimal,
    },

    /// Catalog has no price-points.
    #[error("catalog has no price-points")]
    EmptyCatalog,

    /// A price-point of zero.
    #[error("catalog contains a non-positive price-point")]
    NonPositivePrice,

    /// A reward of zero.
    #[error("catalog price-point {price} has a non-positive reward")]
    NonPositiveReward {
        /// Price-point with the zero reward
        price: u64,
    },

    /// Price or reward cannot be represented exactly as a solver coefficient.
    #[error("value cannot be represented exactly as a solver coefficient: {value}")]
    CoefficientNotRepresentable {
        /// Offending value
        value: u64,
    },

    /// Wrapped solver resolution error (infeasible, unbounded or backend failure)
    #[error(transparent)]
    ResolutionError(#[from] ResolutionError),

    /// Solver assigned a value that is not within tolerance of a valid integer.
    #[error("solver returned non-integral value {value} for price-point {price}")]
    NonIntegralValue {
        /// Price-point of the variable
        price: u64,

        /// Raw value returned by the solver
        value: f64,
    },

    /// The solve took longer than the configured time budget.
    #[error("solve took {elapsed:?}, exceeding the time budget of {limit:?}")]
    TimeBudgetExceeded {
        /// Wall-clock time spent solving
        elapsed: Duration,

        /// Configured time budget
        limit: Duration,
    },

    /// Internal solver invariant was violated (this is a bug).
    #[error("solver invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

impl SolverError {
    /// Whether the error came from rejected input or from the solve itself.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NegativeBudget { .. }
            | Self::BudgetNotRepresentable { .. }
            | Self::EmptyCatalog
            | Self::NonPositivePrice
            | Self::NonPositiveReward { .. }
            | Self::CoefficientNotRepresentable { .. } => ErrorKind::InvalidInput,
            Self::ResolutionError(_)
            | Self::NonIntegralValue { .. }
            | Self::TimeBudgetExceeded { .. }
            | Self::InvariantViolation { .. } => ErrorKind::SolverFailure,
        }
    }
}

/// Trait for optimising a budget across a catalog
pub trait Optimizer {
    /// Maximise total reward where every unit earns the base reward.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the input is invalid or the solver fails.
    fn optimize_no_bonus(
        &self,
        budget: Budget,
        catalog: &Catalog,
    ) -> Result<OptimizationResult, SolverError>;

    /// Maximise total reward where the first unit at each price-point earns the bonus reward.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the input is invalid or the solver fails.
    fn optimize_with_bonus(
        &self,
        budget: Budget,
        catalog: &Catalog,
    ) -> Result<OptimizationResult, SolverError>;

    /// Optimise for the given reward mode.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the input is invalid or the solver fails.
    fn optimize_mode(
        &self,
        budget: Budget,
        mode: RewardMode,
        catalog: &Catalog,
    ) -> Result<OptimizationResult, SolverError> {
        match mode {
            RewardMode::Standard => self.optimize_no_bonus(budget, catalog),
            RewardMode::FirstTimeBonus => self.optimize_with_bonus(budget, catalog),
        }
    }

    /// Optimise with the first-time bonus switched on or off.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the input is invalid or the solver fails.
    fn optimize(
        &self,
        budget: Budget,
        bonus_enabled: bool,
        catalog: &Catalog,
    ) -> Result<OptimizationResult, SolverError> {
        self.optimize_mode(budget, RewardMode::from_bonus_enabled(bonus_enabled), catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_classified_as_invalid_input() {
        let errors = [
            SolverError::NegativeBudget {
                budget: Decimal::NEGATIVE_ONE,
            },
            SolverError::EmptyCatalog,
            SolverError::NonPositivePrice,
            SolverError::NonPositiveReward { price: 5 },
        ];

        for error in errors {
            assert_eq!(error.kind(), ErrorKind::InvalidInput, "{error}");
        }
    }

    #[test]
    fn solve_errors_are_classified_as_solver_failure() {
        let errors = [
            SolverError::ResolutionError(ResolutionError::Infeasible),
            SolverError::ResolutionError(ResolutionError::Unbounded),
            SolverError::NonIntegralValue {
                price: 5,
                value: 0.5,
            },
            SolverError::TimeBudgetExceeded {
                elapsed: Duration::from_secs(2),
                limit: Duration::from_secs(1),
            },
        ];

        for error in errors {
            assert_eq!(error.kind(), ErrorKind::SolverFailure, "{error}");
        }
    }
}
