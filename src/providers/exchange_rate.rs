use super::util::{get_json, http_client, redact};
use crate::core::rates::{FiatRateProvider, FiatRates, RateTable};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
pub struct ExchangeRateResponse {
    result: String,
    base_code: String,
    time_last_update_unix: Option<i64>,
    conversion_rates: HashMap<String, f64>,
}

/// Keeps allow-listed codes, in allow-list order, with usable rates only.
pub fn normalize_fiat(
    raw: ExchangeRateResponse,
    base_currency: &str,
    allow_list: &[String],
) -> Result<FiatRates> {
    if raw.result != "success" {
        return Err(anyhow!("Fiat provider reported result: {}", raw.result));
    }
    if !raw.base_code.eq_ignore_ascii_case(base_currency) {
        return Err(anyhow!(
            "Fiat provider returned base {} instead of {}",
            raw.base_code,
            base_currency
        ));
    }

    let mut rates = RateTable::new();
    for code in allow_list {
        match raw.conversion_rates.get(code) {
            Some(_) if code.eq_ignore_ascii_case(base_currency) => rates.insert(code.clone(), 1.0),
            Some(rate) if rate.is_finite() && *rate > 0.0 => rates.insert(code.clone(), *rate),
            Some(rate) => debug!(code = %code, rate, "Skipping unusable fiat rate"),
            None => debug!(code = %code, "Allow-listed currency missing from provider"),
        }
    }

    if rates.is_empty() {
        return Err(anyhow!("No allow-listed currencies in fiat response"));
    }

    Ok(FiatRates {
        base: base_currency.to_uppercase(),
        rates,
        updated_at: raw
            .time_last_update_unix
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
    })
}

/// ExchangeRate-API v6 `latest` endpoint.
pub struct ExchangeRateProvider {
    base_url: String,
    api_key: Option<String>,
    base_currency: String,
    allow_list: Vec<String>,
}

impl ExchangeRateProvider {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        base_currency: &str,
        allow_list: &[String],
    ) -> Self {
        ExchangeRateProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            base_currency: base_currency.to_uppercase(),
            allow_list: allow_list.to_vec(),
        }
    }
}

#[async_trait]
impl FiatRateProvider for ExchangeRateProvider {
    #[instrument(name = "FiatRatesFetch", skip(self), fields(base = %self.base_currency))]
    async fn fetch_fiat_rates(&self) -> Result<FiatRates> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Missing API key for fiat rates"))?;

        let url = format!(
            "{}/v6/{}/latest/{}",
            self.base_url, api_key, self.base_currency
        );
        debug!(
            "Requesting fiat rates from {}/v6/***/latest/{}",
            redact(&self.base_url),
            self.base_currency
        );

        let client = http_client(None)?;
        let raw: ExchangeRateResponse = get_json(&client, &url, "fiat rates").await?;
        normalize_fiat(raw, &self.base_currency, &self.allow_list)
    }
}
