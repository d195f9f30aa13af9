use super::util::{get_json, http_client};
use crate::core::rates::{CryptoRateProvider, CryptoRates, RateTable};
use crate::visuals::ImageProvider;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

const API_KEY_HEADER: &str = "x-cg-demo-api-key";
const QUOTE_CURRENCY: &str = "usd";

#[derive(Debug, Deserialize)]
pub struct SimplePrice {
    usd: Option<f64>,
}

/// `/simple/price` body: slug -> quotes.
pub type SimplePriceResponse = HashMap<String, SimplePrice>;

#[derive(Debug, Deserialize)]
struct CoinResponse {
    image: Option<CoinImage>,
}

#[derive(Debug, Deserialize)]
struct CoinImage {
    small: Option<String>,
}

/// Orders quotes by the configured slug list and drops zero or missing prices.
pub fn normalize_crypto(raw: SimplePriceResponse, ids: &[String]) -> Result<CryptoRates> {
    let mut rates = RateTable::new();
    for id in ids {
        match raw.get(id).and_then(|price| price.usd) {
            Some(usd) if usd.is_finite() && usd > 0.0 => rates.insert(id.clone(), usd),
            Some(usd) => debug!(id = %id, usd, "Crypto temporarily unpriced"),
            None => debug!(id = %id, "Crypto missing from price response"),
        }
    }

    if rates.is_empty() {
        return Err(anyhow!("No crypto prices in response"));
    }

    Ok(CryptoRates {
        quote_currency: QUOTE_CURRENCY.to_uppercase(),
        rates,
    })
}

/// CoinGecko simple price and coin endpoints.
/// One client serves the price request and every image request of a session.
pub struct CoinGeckoProvider {
    base_url: String,
    client: Client,
    ids: Vec<String>,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, api_key: Option<&str>, ids: &[String]) -> Result<Self> {
        Ok(CoinGeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(api_key.map(|key| (API_KEY_HEADER, key)))?,
            ids: ids.to_vec(),
        })
    }
}

#[async_trait]
impl CryptoRateProvider for CoinGeckoProvider {
    #[instrument(name = "CryptoRatesFetch", skip(self), fields(ids = self.ids.len()))]
    async fn fetch_crypto_rates(&self) -> Result<CryptoRates> {
        let url = format!(
            "{}/api/v3/simple/price?vs_currencies={}&ids={}",
            self.base_url,
            QUOTE_CURRENCY,
            self.ids.join(",")
        );
        debug!("Requesting crypto prices from {}", url);

        let raw: SimplePriceResponse = get_json(&self.client, &url, "crypto rates").await?;
        normalize_crypto(raw, &self.ids)
    }
}

#[async_trait]
impl ImageProvider for CoinGeckoProvider {
    #[instrument(name = "CryptoImageFetch", skip(self))]
    async fn fetch_image_url(&self, slug: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/api/v3/coins/{}?tickers=false&market_data=false&community_data=false&developer_data=false&localization=false",
            self.base_url,
            slug.to_lowercase()
        );
        debug!("Requesting crypto image from {}", url);

        let coin: CoinResponse = get_json(&self.client, &url, slug).await?;
        Ok(coin
            .image
            .and_then(|image| image.small)
            .filter(|small| !small.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|id| id.to_string()).collect()
    }

    #[tokio::test]
    async fn test_successful_crypto_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .and(query_param("vs_currencies", "usd"))
            .and(query_param("ids", "bitcoin,ethereum,terra,neo"))
            .and(header("x-cg-demo-api-key", "cg-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{
                    "ethereum": {"usd": 3200.5},
                    "bitcoin": {"usd": 65000},
                    "terra": {"usd": 0}
                }"#,
            ))
            .mount(&mock_server)
            .await;

        let provider = CoinGeckoProvider::new(
            &mock_server.uri(),
            Some("cg-key"),
            &ids(&["bitcoin", "ethereum", "terra", "neo"]),
        )
        .unwrap();
        let crypto = provider.fetch_crypto_rates().await.unwrap();

        assert_eq!(crypto.quote_currency, "USD");
        let codes: Vec<_> = crypto.rates.iter().map(|(code, _)| code).collect();
        assert_eq!(codes, vec!["bitcoin", "ethereum"]);
        assert_eq!(crypto.rates.get("bitcoin"), Some(65000.0));
        assert_eq!(crypto.rates.get("terra"), None);
    }

    #[tokio::test]
    async fn test_crypto_rate_limited_is_unavailable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), None, &ids(&["bitcoin"])).unwrap();
        let result = provider.fetch_crypto_rates().await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 429 Too Many Requests for crypto rates"
        );
    }

    #[tokio::test]
    async fn test_crypto_shape_mismatch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"["bitcoin"]"#))
            .mount(&mock_server)
            .await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), None, &ids(&["bitcoin"])).unwrap();
        assert!(provider.fetch_crypto_rates().await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_image_url() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/coins/bitcoin"))
            .and(query_param("market_data", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id": "bitcoin", "image": {"thumb": "t.png", "small": "https://img/bitcoin-small.png"}}"#,
            ))
            .mount(&mock_server)
            .await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), None, &[]).unwrap();
        let url = provider.fetch_image_url("bitcoin").await.unwrap();
        assert_eq!(url.as_deref(), Some("https://img/bitcoin-small.png"));
    }

    #[tokio::test]
    async fn test_fetch_image_without_image_field() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/coins/terra"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id": "terra"}"#))
            .mount(&mock_server)
            .await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), None, &[]).unwrap();
        assert_eq!(provider.fetch_image_url("terra").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_price_and_image_share_keyed_client() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .and(header("x-cg-demo-api-key", "cg-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"bitcoin": {"usd": 65000}}"#))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v3/coins/bitcoin"))
            .and(header("x-cg-demo-api-key", "cg-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id": "bitcoin", "image": {"small": "https://img/bitcoin-small.png"}}"#,
            ))
            .expect(2)
            .mount(&mock_server)
            .await;

        let provider =
            CoinGeckoProvider::new(&mock_server.uri(), Some("cg-key"), &ids(&["bitcoin"])).unwrap();
        assert!(provider.fetch_crypto_rates().await.is_ok());
        for _ in 0..2 {
            let url = provider.fetch_image_url("bitcoin").await.unwrap();
            assert_eq!(url.as_deref(), Some("https://img/bitcoin-small.png"));
        }
    }

    #[test]
    fn test_invalid_api_key_fails_construction() {
        let result = CoinGeckoProvider::new("http://127.0.0.1:9", Some("bad\nkey"), &[]);
        assert!(result.is_err());
    }
}
