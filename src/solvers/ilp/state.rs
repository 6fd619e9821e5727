//! ILP State

use std::fmt;

use good_lp::{Expression, ProblemVariables, Variable, variable};
use smallvec::SmallVec;

use crate::{
    allocation::RewardMode,
    catalog::Catalog,
    solvers::{
        SolverError,
        ilp::{observer::ILPObserver, u64_to_f64_exact},
    },
};

/// Relation operator for a linear ILP constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintRelation {
    /// Less than or equal (`lhs <= rhs`)
    Leq,

    /// Greater than or equal (`lhs >= rhs`)
    Geq,
}

impl ConstraintRelation {
    /// Operator as written in a formulation
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Leq => "<=",
            Self::Geq => ">=",
        }
    }
}

/// Recorded linear ILP constraint emitted during model construction.
#[derive(Debug, Clone)]
pub(crate) struct ILPConstraint {
    /// Constraint type, for observers
    pub(crate) name: &'static str,

    /// Left-hand side expression
    pub(crate) lhs: Expression,

    /// Relation operator
    pub(crate) relation: ConstraintRelation,

    /// Right-hand side scalar
    pub(crate) rhs: f64,
}

/// Decision variables declared for one price-point.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PriceVars {
    /// Price-point
    pub(crate) price: u64,

    /// Price as a solver coefficient
    pub(crate) price_coeff: f64,

    /// Units earning the base reward
    pub(crate) count: Variable,

    /// Binary first-time bonus unit, bonus mode only
    pub(crate) bonus: Option<Variable>,
}

/// Builder state for ILP problem variables, objective and constraints
pub(crate) struct ILPState {
    pb: ProblemVariables,
    reward: Expression,
    price_vars: SmallVec<[PriceVars; 8]>,
    constraints: Vec<ILPConstraint>,
}

impl fmt::Debug for ILPState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ILPState")
            .field("pb", &"<ProblemVariables>")
            .field("reward", &"<Expression>")
            .field(
                "price_vars",
                &format!("[{} price-points]", self.price_vars.len()),
            )
            .field(
                "constraints",
                &format!("[{} constraints]", self.constraints.len()),
            )
            .finish()
    }
}

impl ILPState {
    /// Declare the decision variables for every catalog price-point and build the
    /// reward objective.
    ///
    /// Every price-point gets a non-negative integer count variable earning the
    /// base reward. In [`RewardMode::FirstTimeBonus`] it also gets a binary bonus
    /// variable earning the bonus reward; buying that unit is independent of how
    /// many regular units are bought.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] if a price or reward cannot be represented exactly as
    /// a solver coefficient.
    pub(crate) fn with_catalog_and_observer<O: ILPObserver + ?Sized>(
        catalog: &Catalog,
        mode: RewardMode,
        observer: &mut O,
    ) -> Result<Self, SolverError> {
        let mut pb = ProblemVariables::new();
        let mut reward = Expression::default();
        let mut price_vars = SmallVec::new();

        for entry in catalog {
            let price_coeff = coefficient(entry.price)?;
            let base_coeff = coefficient(entry.base_reward)?;

            let count = pb.add(variable().integer().min(0));

            reward += count * base_coeff;

            observer.on_count_variable(entry.price, count, entry.base_reward);
            observer.on_objective_term(count, base_coeff);

            let bonus = match mode {
                RewardMode::Standard => None,
                RewardMode::FirstTimeBonus => {
                    let bonus_coeff = coefficient(entry.bonus_reward)?;
                    let bonus = pb.add(variable().binary());

                    reward += bonus * bonus_coeff;

                    observer.on_bonus_variable(entry.price, bonus, entry.bonus_reward);
                    observer.on_objective_term(bonus, bonus_coeff);

                    Some(bonus)
                }
            };

            price_vars.push(PriceVars {
                price: entry.price,
                price_coeff,
                count,
                bonus,
            });
        }

        Ok(Self {
            pb,
            reward,
            price_vars,
            constraints: Vec::new(),
        })
    }

    /// Variables declared per price-point, ascending by price.
    pub(crate) fn price_vars(&self) -> &[PriceVars] {
        &self.price_vars
    }

    /// Extract the problem variables, reward expression, per-price variables and
    /// all recorded constraints.
    pub(crate) fn into_parts(
        self,
    ) -> (
        ProblemVariables,
        Expression,
        SmallVec<[PriceVars; 8]>,
        Vec<ILPConstraint>,
    ) {
        (self.pb, self.reward, self.price_vars, self.constraints)
    }

    /// Record a less-than-or-equal constraint.
    pub(crate) fn add_leq_constraint(&mut self, name: &'static str, lhs: Expression, rhs: f64) {
        self.constraints.push(ILPConstraint {
            name,
            lhs,
            relation: ConstraintRelation::Leq,
            rhs,
        });
    }

    /// Record a greater-than-or-equal constraint.
    pub(crate) fn add_geq_constraint(&mut self, name: &'static str, lhs: Expression, rhs: f64) {
        self.constraints.push(ILPConstraint {
            name,
            lhs,
            relation: ConstraintRelation::Geq,
            rhs,
        });
    }
}

fn coefficient(value: u64) -> Result<f64, SolverError> {
    u64_to_f64_exact(value).ok_or(SolverError::CoefficientNotRepresentable { value })
}
