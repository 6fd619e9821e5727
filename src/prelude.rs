//! Topup prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocation::{Allocation, OptimizationResult, Purchase, RewardMode},
    budget::Budget,
    catalog::{Catalog, CatalogEntry, CatalogError},
    fixtures::{FixtureError, Fixtures, NamedCatalog},
    solvers::{
        ErrorKind, Optimizer, SolverError,
        ilp::{ILPObserver, ILPOptimizer, NoopObserver, TracingObserver},
    },
    sweep::{BudgetRange, OnFailure, Sweep, SweepError, SweepPoint, sweep},
};
