//! Offline provider serving bundled snapshots through the live normalisation.

use super::coingecko::{SimplePriceResponse, normalize_crypto};
use super::exchange_rate::{ExchangeRateResponse, normalize_fiat};
use super::metals_dev::{MetalsResponse, normalize_metal};
use crate::core::rates::{
    CryptoRateProvider, CryptoRates, FiatRateProvider, FiatRates, MetalRateProvider, MetalRates,
};
use crate::visuals::ImageProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

const FIAT_FIXTURE: &str = include_str!("../../fixtures/fiat.json");
const CRYPTO_FIXTURE: &str = include_str!("../../fixtures/crypto.json");
const METALS_FIXTURE: &str = include_str!("../../fixtures/metals.json");

pub struct FixtureProvider {
    base_currency: String,
    allow_list: Vec<String>,
    crypto_ids: Vec<String>,
}

impl FixtureProvider {
    pub fn new(base_currency: &str, allow_list: &[String], crypto_ids: &[String]) -> Self {
        FixtureProvider {
            base_currency: base_currency.to_uppercase(),
            allow_list: allow_list.to_vec(),
            crypto_ids: crypto_ids.to_vec(),
        }
    }
}

#[async_trait]
impl FiatRateProvider for FixtureProvider {
    async fn fetch_fiat_rates(&self) -> Result<FiatRates> {
        debug!("Serving fiat rates from fixture");
        let raw: ExchangeRateResponse =
            serde_json::from_str(FIAT_FIXTURE).context("Invalid fiat fixture")?;
        normalize_fiat(raw, &self.base_currency, &self.allow_list)
    }
}

#[async_trait]
impl CryptoRateProvider for FixtureProvider {
    async fn fetch_crypto_rates(&self) -> Result<CryptoRates> {
        debug!("Serving crypto rates from fixture");
        let raw: SimplePriceResponse =
            serde_json::from_str(CRYPTO_FIXTURE).context("Invalid crypto fixture")?;
        normalize_crypto(raw, &self.crypto_ids)
    }
}

#[async_trait]
impl MetalRateProvider for FixtureProvider {
    async fn fetch_metal_rates(&self) -> Result<MetalRates> {
        debug!("Serving metal rates from fixture");
        let raw: MetalsResponse =
            serde_json::from_str(METALS_FIXTURE).context("Invalid metals fixture")?;
        normalize_metal(raw, &self.base_currency)
    }
}

/// No images offline; the UI falls back to placeholders.
#[async_trait]
impl ImageProvider for FixtureProvider {
    async fn fetch_image_url(&self, _slug: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{DEFAULT_CRYPTO_IDS, DEFAULT_CURRENCIES};
    use crate::core::load_snapshot;

    fn provider() -> FixtureProvider {
        let allow_list: Vec<String> = DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect();
        let ids: Vec<String> = DEFAULT_CRYPTO_IDS.iter().map(|c| c.to_string()).collect();
        FixtureProvider::new("ISK", &allow_list, &ids)
    }

    #[tokio::test]
    async fn test_fixture_fiat_is_filtered_like_live() {
        let fiat = provider().fetch_fiat_rates().await.unwrap();
        assert_eq!(fiat.rates.len(), 17);
        assert!(!fiat.rates.contains("PLN"));
        assert!(!fiat.rates.contains("AED"));
        assert_eq!(fiat.rates.iter().next().map(|(code, _)| code), Some("USD"));
        assert_eq!(fiat.rates.get("ISK"), Some(1.0));
    }

    #[tokio::test]
    async fn test_fixture_metals_drop_variants() {
        let metal = provider().fetch_metal_rates().await.unwrap();
        assert!(metal.rates.iter().all(|(code, _)| !code.contains('_')));
        assert_eq!(metal.rates.len(), 9);
        assert_eq!(metal.meta.unit, "g");
    }

    #[tokio::test]
    async fn test_fixture_crypto_skips_unpriced() {
        let crypto = provider().fetch_crypto_rates().await.unwrap();
        assert_eq!(crypto.rates.get("bitcoin"), Some(65000.0));
        assert!(!crypto.rates.contains("terra"));
        assert!(!crypto.rates.contains("ftx-token"));
    }

    #[tokio::test]
    async fn test_fixture_snapshot_loads() {
        let provider = provider();
        let snapshot = load_snapshot(&provider, &provider, &provider)
            .await
            .unwrap();
        assert_eq!(snapshot.fiat.base, "ISK");
        assert!(!snapshot.crypto.rates.is_empty());
    }
}
