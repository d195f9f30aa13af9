//! Unified asset list built from a rate snapshot, with filtering and sorting.

use crate::core::asset::{Asset, AssetClass};
use crate::core::rates::RateSnapshot;
use anyhow::anyhow;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetFilter {
    #[default]
    All,
    Only(AssetClass),
}

impl AssetFilter {
    pub fn matches(&self, class: AssetClass) -> bool {
        match self {
            AssetFilter::All => true,
            AssetFilter::Only(wanted) => *wanted == class,
        }
    }
}

impl FromStr for AssetFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(AssetFilter::All);
        }
        s.parse().map(AssetFilter::Only)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Merge order. There is no real popularity ranking.
    #[default]
    Popularity,
    PriceHigh,
    PriceLow,
    Name,
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortKey::Popularity => "popularity",
                SortKey::PriceHigh => "priceHigh",
                SortKey::PriceLow => "priceLow",
                SortKey::Name => "name",
            }
        )
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "popularity" => Ok(SortKey::Popularity),
            "pricehigh" => Ok(SortKey::PriceHigh),
            "pricelow" => Ok(SortKey::PriceLow),
            "name" => Ok(SortKey::Name),
            _ => Err(anyhow!("Invalid sort key: {}", s)),
        }
    }
}

/// Merges the three tables: currencies, then crypto, then metals.
pub fn build_catalog(snapshot: &RateSnapshot) -> Vec<Asset> {
    let assets: Vec<Asset> = AssetClass::ALL
        .iter()
        .flat_map(|class| {
            snapshot
                .table(*class)
                .iter()
                .map(|(code, rate)| Asset::new(*class, code, rate))
        })
        .collect();
    debug!("Built catalog with {} assets", assets.len());
    assets
}

/// Keeps assets of the wanted class whose code or name contains `search`, ignoring case.
pub fn filter(assets: &[Asset], class_filter: AssetFilter, search: &str) -> Vec<Asset> {
    let needle = search.trim().to_lowercase();
    assets
        .iter()
        .filter(|asset| class_filter.matches(asset.class))
        .filter(|asset| {
            needle.is_empty()
                || asset.code.to_lowercase().contains(&needle)
                || asset.display_name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Stable sort: equal keys keep their relative order.
pub fn sort(mut assets: Vec<Asset>, key: SortKey) -> Vec<Asset> {
    match key {
        SortKey::Popularity => {}
        SortKey::PriceHigh => assets.sort_by(|a, b| b.unit_value.total_cmp(&a.unit_value)),
        SortKey::PriceLow => assets.sort_by(|a, b| a.unit_value.total_cmp(&b.unit_value)),
        SortKey::Name => assets.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
        }),
    }
    assets
}
