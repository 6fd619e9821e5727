//! Topup
//!
//! Topup finds the reward-maximising way to spend a budget across a catalog of
//! discretely-priced top-up packs, with or without a first-time bonus on each
//! pack, by solving a small integer linear program.

pub mod allocation;
pub mod budget;
pub mod catalog;
pub mod config;
pub mod fixtures;
pub mod observability;
pub mod prelude;
pub mod report;
pub mod solvers;
pub mod sweep;
