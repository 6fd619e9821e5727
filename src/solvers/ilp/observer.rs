//! ILP Observer

use good_lp::{Expression, IntoAffineExpression, Variable};
use tracing::trace;

use crate::solvers::ilp::state::ConstraintRelation;

/// Observer trait for capturing the ILP formulation as it's built.
///
/// The optimizer stays the only place the model is constructed; observers
/// passively record variables, objective terms and constraints for logging
/// or analysis.
///
/// When no observer is provided the optimizer uses [`NoopObserver`] and the
/// calls are optimised away via monomorphization.
pub trait ILPObserver {
    /// Called when a purchase-count variable is created for a price-point.
    ///
    /// In bonus mode this is the count of regular (non-bonus) units.
    ///
    /// # Parameters
    ///
    /// - `price`: Price-point the variable belongs to
    /// - `var`: The non-negative integer decision variable
    /// - `reward`: Reward earned per unit
    fn on_count_variable(&mut self, price: u64, var: Variable, reward: u64);

    /// Called when a binary first-time bonus variable is created.
    ///
    /// # Parameters
    ///
    /// - `price`: Price-point the variable belongs to
    /// - `var`: The binary decision variable
    /// - `reward`: Bonus reward for the single bonus unit
    fn on_bonus_variable(&mut self, _price: u64, _var: Variable, _reward: u64) {}

    /// Called when a term is added to the objective function.
    fn on_objective_term(&mut self, _var: Variable, _coefficient: f64) {}

    /// Called when a constraint is added to the model.
    ///
    /// # Parameters
    ///
    /// - `constraint_type`: Human-readable constraint type (e.g. `"budget"`)
    /// - `constraint_expr`: The left-hand side expression
    /// - `relation`: Relation operator
    /// - `rhs`: Right-hand side value
    fn on_constraint(
        &mut self,
        constraint_type: &str,
        constraint_expr: &Expression,
        relation: ConstraintRelation,
        rhs: f64,
    );
}

/// No-op observer for unobserved solves.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl ILPObserver for NoopObserver {
    fn on_count_variable(&mut self, _: u64, _: Variable, _: u64) {}

    fn on_constraint(&mut self, _: &str, _: &Expression, _: ConstraintRelation, _: f64) {}
}

/// Observer emitting every callback as a `trace` level event.
#[derive(Debug, Default)]
pub struct TracingObserver {
    variables: usize,
    constraints: usize,
    constraint_terms: usize,
}

impl TracingObserver {
    /// Number of variables seen so far
    pub fn variables(&self) -> usize {
        self.variables
    }

    /// Number of constraints seen so far
    pub fn constraints(&self) -> usize {
        self.constraints
    }

    /// Total linear terms across every constraint seen so far
    pub fn constraint_terms(&self) -> usize {
        self.constraint_terms
    }
}

impl ILPObserver for TracingObserver {
    fn on_count_variable(&mut self, price: u64, var: Variable, reward: u64) {
        self.variables += 1;

        trace!(price, reward, ?var, "count variable");
    }

    fn on_bonus_variable(&mut self, price: u64, var: Variable, reward: u64) {
        self.variables += 1;

        trace!(price, reward, ?var, "bonus variable");
    }

    fn on_objective_term(&mut self, var: Variable, coefficient: f64) {
        trace!(?var, coefficient, "objective term");
    }

    fn on_constraint(
        &mut self,
        constraint_type: &str,
        constraint_expr: &Expression,
        relation: ConstraintRelation,
        rhs: f64,
    ) {
        let terms = constraint_expr.linear_coefficients().count();

        self.constraints += 1;
        self.constraint_terms += terms;

        trace!(
            constraint_type,
            terms,
            relation = relation.symbol(),
            rhs,
            "constraint"
        );
    }
}
