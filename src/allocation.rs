//! Allocations

use smallvec::SmallVec;

use crate::catalog::{Catalog, CatalogEntry};

/// Whether the first unit at each price-point earns the bonus reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewardMode {
    /// Every unit earns the base reward
    Standard,

    /// The first unit at each price-point earns the bonus reward
    FirstTimeBonus,
}

impl RewardMode {
    /// Mode for a bonus on/off flag
    pub fn from_bonus_enabled(bonus_enabled: bool) -> Self {
        if bonus_enabled {
            Self::FirstTimeBonus
        } else {
            Self::Standard
        }
    }
}

/// Units bought at a single price-point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchase {
    /// Price-point
    pub price: u64,

    /// Total units bought, bonus unit included
    pub units: u64,

    /// How many of `units` earned the first-time bonus (0 or 1)
    pub bonus_units: u64,
}

impl Purchase {
    /// Units that earned the base reward
    pub fn regular_units(&self) -> u64 {
        self.units.saturating_sub(self.bonus_units)
    }

    /// Amount spent on this price-point
    pub fn spend(&self) -> u64 {
        self.price.saturating_mul(self.units)
    }

    /// Reward earned by this purchase, following its bonus/regular split.
    pub fn reward(&self, entry: &CatalogEntry) -> u64 {
        entry
            .base_reward
            .saturating_mul(self.regular_units())
            .saturating_add(entry.bonus_reward.saturating_mul(self.bonus_units))
    }
}

/// Purchase counts for every catalog price-point, ascending by price.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    purchases: SmallVec<[Purchase; 8]>,
}

impl Allocation {
    /// An allocation buying nothing at every price-point of the catalog
    pub fn empty(catalog: &Catalog) -> Self {
        catalog
            .prices()
            .map(|price| Purchase {
                price,
                units: 0,
                bonus_units: 0,
            })
            .collect()
    }

    /// Units bought at `price`, or `None` if the price-point is unknown.
    pub fn count(&self, price: u64) -> Option<u64> {
        self.get(price).map(|purchase| purchase.units)
    }

    /// Purchase at `price`
    pub fn get(&self, price: u64) -> Option<&Purchase> {
        self.purchases
            .binary_search_by_key(&price, |purchase| purchase.price)
            .ok()
            .and_then(|idx| self.purchases.get(idx))
    }

    /// Iterate purchases in ascending price order
    pub fn iter(&self) -> impl Iterator<Item = &Purchase> {
        self.purchases.iter()
    }

    /// `(price, units)` pairs in ascending price order
    pub fn counts(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.purchases
            .iter()
            .map(|purchase| (purchase.price, purchase.units))
    }

    /// Total amount spent
    pub fn spend(&self) -> u64 {
        self.purchases
            .iter()
            .fold(0_u64, |acc, purchase| acc.saturating_add(purchase.spend()))
    }

    /// Total units bought across all price-points
    pub fn total_units(&self) -> u64 {
        self.purchases
            .iter()
            .fold(0_u64, |acc, purchase| acc.saturating_add(purchase.units))
    }

    /// Number of price-points
    pub fn len(&self) -> usize {
        self.purchases.len()
    }

    /// Whether the allocation covers no price-points
    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty()
    }
}

impl FromIterator<Purchase> for Allocation {
    fn from_iter<I: IntoIterator<Item = Purchase>>(iter: I) -> Self {
        let mut purchases: SmallVec<[Purchase; 8]> = iter.into_iter().collect();

        purchases.sort_by_key(|purchase| purchase.price);

        Self { purchases }
    }
}

/// Result of a single optimisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationResult {
    /// Mode the allocation was optimised for
    pub mode: RewardMode,

    /// Total reward of the allocation
    pub total_reward: u64,

    /// Chosen purchase counts
    pub allocation: Allocation,
}

impl OptimizationResult {
    /// A result that buys nothing
    pub fn empty(mode: RewardMode, catalog: &Catalog) -> Self {
        Self {
            mode,
            total_reward: 0,
            allocation: Allocation::empty(catalog),
        }
    }
}
