//! Rate tables, the per-load snapshot, and the provider abstractions that fill it.

use crate::core::asset::AssetClass;
use crate::core::error::RatesError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Ordered code -> rate table. Insertion order is the catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    entries: Vec<(String, f64)>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the rate for `code`, keeping the original position on replace.
    pub fn insert(&mut self, code: impl Into<String>, rate: f64) {
        let code = code.into();
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some(entry) => entry.1 = rate,
            None => self.entries.push((code, rate)),
        }
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, rate)| *rate)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut table = RateTable::new();
        for (code, rate) in iter {
            table.insert(code, rate);
        }
        table
    }
}

/// Fiat table quoted against the base currency: units of `code` per one base unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiatRates {
    pub base: String,
    pub rates: RateTable,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Crypto spot prices in a reference fiat currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoRates {
    pub quote_currency: String,
    pub rates: RateTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalMeta {
    pub currency: String,
    pub unit: String,
    pub metal_timestamp: Option<DateTime<Utc>>,
    pub currency_timestamp: Option<DateTime<Utc>>,
}

/// Metal prices per unit mass in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalRates {
    pub rates: RateTable,
    pub meta: MetalMeta,
}

/// Everything known about prices for one load. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub fiat: FiatRates,
    pub crypto: CryptoRates,
    pub metal: MetalRates,
}

impl RateSnapshot {
    pub fn table(&self, class: AssetClass) -> &RateTable {
        match class {
            AssetClass::Currency => &self.fiat.rates,
            AssetClass::Crypto => &self.crypto.rates,
            AssetClass::Metal => &self.metal.rates,
        }
    }
}

#[async_trait]
pub trait FiatRateProvider: Send + Sync {
    async fn fetch_fiat_rates(&self) -> Result<FiatRates>;
}

#[async_trait]
pub trait CryptoRateProvider: Send + Sync {
    async fn fetch_crypto_rates(&self) -> Result<CryptoRates>;
}

#[async_trait]
pub trait MetalRateProvider: Send + Sync {
    async fn fetch_metal_rates(&self) -> Result<MetalRates>;
}

/// Fetches all three tables concurrently. Any failed provider fails the whole load.
pub async fn load_snapshot(
    fiat: &dyn FiatRateProvider,
    crypto: &dyn CryptoRateProvider,
    metal: &dyn MetalRateProvider,
) -> std::result::Result<RateSnapshot, RatesError> {
    let (fiat, crypto, metal) = tokio::join!(
        fiat.fetch_fiat_rates(),
        crypto.fetch_crypto_rates(),
        metal.fetch_metal_rates()
    );

    let mut failed = Vec::new();
    if let Err(e) = &fiat {
        warn!(error = %e, "Fiat rates unavailable");
        failed.push(AssetClass::Currency);
    }
    if let Err(e) = &crypto {
        warn!(error = %e, "Crypto rates unavailable");
        failed.push(AssetClass::Crypto);
    }
    if let Err(e) = &metal {
        warn!(error = %e, "Metal rates unavailable");
        failed.push(AssetClass::Metal);
    }

    match (fiat, crypto, metal) {
        (Ok(fiat), Ok(crypto), Ok(metal)) => {
            debug!(
                fiat = fiat.rates.len(),
                crypto = crypto.rates.len(),
                metal = metal.rates.len(),
                "Loaded rate snapshot"
            );
            Ok(RateSnapshot {
                fiat,
                crypto,
                metal,
            })
        }
        _ => Err(RatesError::Unavailable { classes: failed }),
    }
}
