use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_CURRENCY: &str = "ISK";

/// Curated fiat allow-list. Provider codes outside it are dropped.
pub const DEFAULT_CURRENCIES: [&str; 17] = [
    "USD", "EUR", "ISK", "GBP", "JPY", "AUD", "CAD", "CHF", "SEK", "NOK", "DKK", "INR", "CNY",
    "RUB", "KRW", "BRL", "ZAR",
];

pub const DEFAULT_CRYPTO_IDS: [&str; 49] = [
    "bitcoin",
    "ethereum",
    "xrp",
    "tether",
    "solana",
    "binance-coin",
    "usd-coin",
    "cardano",
    "terra",
    "polkadot",
    "dogecoin",
    "avalanche",
    "shiba-inu",
    "polygon",
    "crypto-com-coin",
    "wrapped-bitcoin",
    "dai",
    "cosmos",
    "near-protocol",
    "chainlink",
    "tron",
    "uniswap",
    "algorand",
    "bitcoin-cash",
    "stellar",
    "vechain",
    "axie-infinity",
    "terrausd",
    "hedera",
    "elrond",
    "theta-fuel",
    "monero",
    "tezos",
    "helium",
    "ftx-token",
    "flow",
    "ethereum-classic",
    "theta",
    "klaytn",
    "magic-internet-money",
    "leo-token",
    "celo",
    "osmosis",
    "bitcoin-sv",
    "iota",
    "curve-dao-token",
    "arweave",
    "quant",
    "neo",
];

/// Minimum spacing between crypto image requests.
pub const DEFAULT_IMAGE_SPACING_MS: u64 = 1000;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ProviderConfig {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FlagsConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: ProviderConfig,
    #[serde(default = "default_coingecko")]
    pub coingecko: ProviderConfig,
    #[serde(default = "default_metals_dev")]
    pub metals_dev: ProviderConfig,
    #[serde(default = "default_flags")]
    pub flags: FlagsConfig,
}

fn default_exchange_rate() -> ProviderConfig {
    ProviderConfig::new("https://v6.exchangerate-api.com")
}

fn default_coingecko() -> ProviderConfig {
    ProviderConfig::new("https://api.coingecko.com")
}

fn default_metals_dev() -> ProviderConfig {
    ProviderConfig::new("https://api.metals.dev")
}

fn default_flags() -> FlagsConfig {
    FlagsConfig {
        base_url: "https://flagcdn.com".to_string(),
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchange_rate: default_exchange_rate(),
            coingecko: default_coingecko(),
            metals_dev: default_metals_dev(),
            flags: default_flags(),
        }
    }
}

fn default_base_currency() -> String {
    DEFAULT_BASE_CURRENCY.to_string()
}

fn default_currencies() -> Vec<String> {
    DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect()
}

fn default_crypto_ids() -> Vec<String> {
    DEFAULT_CRYPTO_IDS.iter().map(|c| c.to_string()).collect()
}

fn default_image_spacing_ms() -> u64 {
    DEFAULT_IMAGE_SPACING_MS
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default = "default_currencies")]
    pub currencies: Vec<String>,
    #[serde(default = "default_crypto_ids")]
    pub crypto_ids: Vec<String>,
    /// Serve bundled fixtures instead of calling the providers.
    #[serde(default)]
    pub offline: bool,
    #[serde(default = "default_image_spacing_ms")]
    pub image_spacing_ms: u64,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_currency: default_base_currency(),
            currencies: default_currencies(),
            crypto_ids: default_crypto_ids(),
            offline: false,
            image_spacing_ms: default_image_spacing_ms(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when there is none.
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default().with_env_keys());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("is", "gengi", "gengi")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config.with_env_keys())
    }

    /// Fills missing API keys from `GENGI_*_API_KEY` environment variables.
    pub fn with_env_keys(mut self) -> Self {
        let keys = [
            (
                "GENGI_EXCHANGE_RATE_API_KEY",
                &mut self.providers.exchange_rate.api_key,
            ),
            (
                "GENGI_COINGECKO_API_KEY",
                &mut self.providers.coingecko.api_key,
            ),
            ("GENGI_METALS_API_KEY", &mut self.providers.metals_dev.api_key),
        ];
        for (var, slot) in keys {
            if slot.is_none() {
                *slot = std::env::var(var).ok().filter(|key| !key.is_empty());
            }
        }
        self
    }
}
