pub mod coingecko;
pub mod exchange_rate;
pub mod fixture;
pub mod metals_dev;
pub mod util;

use crate::core::config::AppConfig;
use crate::core::rates::{CryptoRateProvider, FiatRateProvider, MetalRateProvider};
use crate::visuals::ImageProvider;
use coingecko::CoinGeckoProvider;
use exchange_rate::ExchangeRateProvider;
use fixture::FixtureProvider;
use metals_dev::MetalsDevProvider;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// The adapters one session talks to.
pub struct ProviderSet {
    pub fiat: Arc<dyn FiatRateProvider>,
    pub crypto: Arc<dyn CryptoRateProvider>,
    pub metal: Arc<dyn MetalRateProvider>,
    pub images: Arc<dyn ImageProvider>,
}

impl ProviderSet {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        if config.offline {
            debug!("Offline mode, serving bundled fixtures");
            let fixture = Arc::new(FixtureProvider::new(
                &config.base_currency,
                &config.currencies,
                &config.crypto_ids,
            ));
            return Ok(ProviderSet {
                fiat: fixture.clone(),
                crypto: fixture.clone(),
                metal: fixture.clone(),
                images: fixture,
            });
        }

        let providers = &config.providers;
        let coingecko = Arc::new(CoinGeckoProvider::new(
            &providers.coingecko.base_url,
            providers.coingecko.api_key.as_deref(),
            &config.crypto_ids,
        )?);

        Ok(ProviderSet {
            fiat: Arc::new(ExchangeRateProvider::new(
                &providers.exchange_rate.base_url,
                providers.exchange_rate.api_key.as_deref(),
                &config.base_currency,
                &config.currencies,
            )),
            crypto: coingecko.clone(),
            metal: Arc::new(MetalsDevProvider::new(
                &providers.metals_dev.base_url,
                providers.metals_dev.api_key.as_deref(),
                &config.base_currency,
            )),
            images: coingecko,
        })
    }
}
