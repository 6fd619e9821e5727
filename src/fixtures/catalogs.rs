//! Catalog Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    catalog::{Catalog, CatalogEntry},
    fixtures::FixtureError,
};

/// Catalog fixture as written in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Display name of the reward currency
    pub name: String,

    /// Currency code the prices are quoted in (e.g. "USD")
    #[serde(default)]
    pub currency: Option<String>,

    /// Map of price-point -> rewards
    pub entries: FxHashMap<u64, EntryFixture>,
}

/// Rewards for one price-point
#[derive(Debug, Deserialize)]
pub struct EntryFixture {
    /// Reward per unit
    pub reward: u64,

    /// First-time reward; defaults to `reward` when the pack has no bonus
    #[serde(default)]
    pub bonus_reward: Option<u64>,
}

/// A catalog together with its fixture metadata
#[derive(Debug, Clone)]
pub struct NamedCatalog {
    /// Display name of the reward currency
    pub name: String,

    /// Currency code the prices are quoted in
    pub currency: Option<String>,

    /// The catalog itself
    pub catalog: Catalog,
}

impl TryFrom<CatalogFixture> for NamedCatalog {
    type Error = FixtureError;

    fn try_from(fixture: CatalogFixture) -> Result<Self, Self::Error> {
        let entries = fixture.entries.into_iter().map(|(price, entry)| {
            CatalogEntry::new(
                price,
                entry.reward,
                entry.bonus_reward.unwrap_or(entry.reward),
            )
        });

        Ok(NamedCatalog {
            name: fixture.name,
            currency: fixture.currency,
            catalog: Catalog::new(entries)?,
        })
    }
}
