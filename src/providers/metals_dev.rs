use super::util::{get_json, http_client, redact};
use crate::core::rates::{MetalMeta, MetalRateProvider, MetalRates, RateTable};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Metals are quoted per gram.
const UNIT: &str = "g";

#[derive(Debug, Deserialize)]
pub struct MetalsResponse {
    status: String,
    currency: String,
    unit: String,
    metals: BTreeMap<String, f64>,
    timestamps: Option<MetalTimestamps>,
}

#[derive(Debug, Deserialize)]
struct MetalTimestamps {
    metal: Option<String>,
    currency: Option<String>,
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

/// Keeps canonical metal keys only; market-qualified variants like `lbma_gold` are dropped.
pub fn normalize_metal(raw: MetalsResponse, base_currency: &str) -> Result<MetalRates> {
    if raw.status != "success" {
        return Err(anyhow!("Metal provider reported status: {}", raw.status));
    }
    if !raw.currency.eq_ignore_ascii_case(base_currency) {
        return Err(anyhow!(
            "Metal provider quoted {} instead of {}",
            raw.currency,
            base_currency
        ));
    }

    let rates: RateTable = raw
        .metals
        .into_iter()
        .filter(|(code, _)| !code.contains('_'))
        .filter(|(code, price)| {
            let usable = price.is_finite() && *price > 0.0;
            if !usable {
                debug!(code = %code, price, "Skipping unusable metal price");
            }
            usable
        })
        .collect();

    if rates.is_empty() {
        return Err(anyhow!("No canonical metal prices in response"));
    }

    let (metal_timestamp, currency_timestamp) = match &raw.timestamps {
        Some(ts) => (
            parse_timestamp(ts.metal.as_deref()),
            parse_timestamp(ts.currency.as_deref()),
        ),
        None => (None, None),
    };

    Ok(MetalRates {
        rates,
        meta: MetalMeta {
            currency: raw.currency.to_uppercase(),
            unit: raw.unit,
            metal_timestamp,
            currency_timestamp,
        },
    })
}

/// metals.dev `latest` endpoint.
pub struct MetalsDevProvider {
    base_url: String,
    api_key: Option<String>,
    base_currency: String,
}

impl MetalsDevProvider {
    pub fn new(base_url: &str, api_key: Option<&str>, base_currency: &str) -> Self {
        MetalsDevProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            base_currency: base_currency.to_uppercase(),
        }
    }
}

#[async_trait]
impl MetalRateProvider for MetalsDevProvider {
    #[instrument(name = "MetalRatesFetch", skip(self), fields(currency = %self.base_currency))]
    async fn fetch_metal_rates(&self) -> Result<MetalRates> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Missing API key for metal rates"))?;

        let url = format!(
            "{}/v1/latest?api_key={}&currency={}&unit={}",
            self.base_url, api_key, self.base_currency, UNIT
        );
        debug!("Requesting metal rates from {}", redact(&url));

        let client = http_client(None)?;
        let raw: MetalsResponse = get_json(&client, &url, "metal rates").await?;
        normalize_metal(raw, &self.base_currency)
    }
}
