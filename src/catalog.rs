//! Catalog

use smallvec::SmallVec;
use thiserror::Error;
use tracing::warn;

/// Catalog construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two entries share the same price-point.
    #[error("duplicate price-point in catalog: {price}")]
    DuplicatePrice {
        /// The repeated price
        price: u64,
    },
}

/// A single purchasable pack: its price and the reward it yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Price of one unit, in whole currency units
    pub price: u64,

    /// Reward for every unit bought without the first-time bonus
    pub base_reward: u64,

    /// Reward for the first unit bought at this price-point
    pub bonus_reward: u64,
}

impl CatalogEntry {
    /// Creates a new catalog entry
    pub fn new(price: u64, base_reward: u64, bonus_reward: u64) -> Self {
        Self {
            price,
            base_reward,
            bonus_reward,
        }
    }

    /// Reward for `count` units when no bonus applies.
    pub fn standard_reward(&self, count: u64) -> u64 {
        self.base_reward.saturating_mul(count)
    }

    /// Reward for `count` units when the first unit earns the bonus reward.
    pub fn first_time_reward(&self, count: u64) -> u64 {
        match count {
            0 => 0,
            n => self
                .bonus_reward
                .saturating_add(self.base_reward.saturating_mul(n - 1)),
        }
    }
}

/// Immutable price-point table, ordered ascending by price.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: SmallVec<[CatalogEntry; 8]>,
}

impl Catalog {
    /// Build a catalog from a set of entries.
    ///
    /// Entries are sorted by price. Emptiness and zero values are accepted here and
    /// rejected by the optimizer, which owns input validation.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicatePrice`] if two entries share a price.
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Result<Self, CatalogError> {
        let mut entries: SmallVec<[CatalogEntry; 8]> = entries.into_iter().collect();

        entries.sort_by_key(|entry| entry.price);

        let duplicate = entries.windows(2).find_map(|pair| match pair {
            [a, b] if a.price == b.price => Some(a.price),
            _ => None,
        });

        if let Some(price) = duplicate {
            return Err(CatalogError::DuplicatePrice { price });
        }

        for entry in entries
            .iter()
            .filter(|entry| entry.bonus_reward <= entry.base_reward)
        {
            warn!(
                price = entry.price,
                base_reward = entry.base_reward,
                bonus_reward = entry.bonus_reward,
                "first-time bonus does not exceed the base reward"
            );
        }

        Ok(Self { entries })
    }

    /// Look up the entry for a price-point.
    pub fn get(&self, price: u64) -> Option<&CatalogEntry> {
        self.entries
            .binary_search_by_key(&price, |entry| entry.price)
            .ok()
            .and_then(|idx| self.entries.get(idx))
    }

    /// Iterate entries in ascending price order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Price-points in ascending order.
    pub fn prices(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().map(|entry| entry.price)
    }

    /// Cheapest entry, if any.
    pub fn cheapest(&self) -> Option<&CatalogEntry> {
        self.entries.first()
    }

    /// Number of price-points
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no price-points
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
