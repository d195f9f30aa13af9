//! Asset model shared by the catalog, the converter and the visual resolver.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum AssetClass {
    Currency,
    Crypto,
    Metal,
}

impl AssetClass {
    pub const ALL: [AssetClass; 3] = [AssetClass::Currency, AssetClass::Crypto, AssetClass::Metal];
}

impl Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AssetClass::Currency => "Currency",
                AssetClass::Crypto => "Crypto",
                AssetClass::Metal => "Metal",
            }
        )
    }
}

impl FromStr for AssetClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "currency" | "fiat" => Ok(AssetClass::Currency),
            "crypto" => Ok(AssetClass::Crypto),
            "metal" | "metals" => Ok(AssetClass::Metal),
            _ => Err(anyhow!("Invalid asset class: {}", s)),
        }
    }
}

/// Identity of an asset. Codes are only unique within a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetKey {
    pub class: AssetClass,
    pub code: String,
}

impl AssetKey {
    pub fn new(class: AssetClass, code: impl Into<String>) -> Self {
        Self {
            class,
            code: code.into(),
        }
    }
}

impl Display for AssetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.class, self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub code: String,
    pub class: AssetClass,
    pub display_name: String,
    /// Price of one unit in the class quote currency (base currency for
    /// currencies and metals, the reference fiat for crypto).
    pub unit_value: f64,
}

impl Asset {
    pub fn new(class: AssetClass, code: &str, unit_value: f64) -> Self {
        Self {
            code: code.to_string(),
            class,
            display_name: display_name(class, code),
            unit_value,
        }
    }

    pub fn key(&self) -> AssetKey {
        AssetKey::new(self.class, self.code.clone())
    }
}

/// Market prefixes used by the metal provider for regional variants.
const METAL_PREFIXES: [&str; 4] = ["lbma_", "lme_", "mcx_", "ibja_"];

fn curated_name(class: AssetClass, code: &str) -> Option<&'static str> {
    let name = match class {
        AssetClass::Currency => match code {
            "USD" => "US Dollar",
            "EUR" => "Euro",
            "ISK" => "Icelandic Króna",
            "GBP" => "British Pound",
            "JPY" => "Japanese Yen",
            "AUD" => "Australian Dollar",
            "CAD" => "Canadian Dollar",
            "CHF" => "Swiss Franc",
            "SEK" => "Swedish Krona",
            "NOK" => "Norwegian Krone",
            "DKK" => "Danish Krone",
            "INR" => "Indian Rupee",
            "CNY" => "Chinese Yuan",
            "RUB" => "Russian Ruble",
            "KRW" => "South Korean Won",
            "BRL" => "Brazilian Real",
            "ZAR" => "South African Rand",
            _ => return None,
        },
        AssetClass::Crypto => match code {
            "bitcoin" => "Bitcoin",
            "ethereum" => "Ethereum",
            "xrp" | "ripple" => "XRP",
            "litecoin" => "Litecoin",
            "tether" => "Tether",
            "binance-coin" | "binancecoin" => "BNB",
            "usd-coin" => "USD Coin",
            "polkadot" => "Polkadot",
            "dogecoin" => "Dogecoin",
            "shiba-inu" => "Shiba Inu",
            "near-protocol" => "NEAR Protocol",
            "crypto-com-coin" => "Cronos",
            "leo-token" => "UNUS SED LEO",
            _ => return None,
        },
        AssetClass::Metal => match code {
            "gold" | "XAU" => "Gold",
            "silver" | "XAG" => "Silver",
            "platinum" | "XPT" => "Platinum",
            "palladium" | "XPD" => "Palladium",
            _ => return None,
        },
    };
    Some(name)
}

/// Human label for an asset, falling back to a title-cased form of the code.
pub fn display_name(class: AssetClass, code: &str) -> String {
    if let Some(name) = curated_name(class, code) {
        return name.to_string();
    }

    match class {
        AssetClass::Currency => code.to_string(),
        AssetClass::Crypto => title_case(code),
        AssetClass::Metal => {
            let lowered = code.to_lowercase();
            let stripped = METAL_PREFIXES
                .iter()
                .find_map(|prefix| lowered.strip_prefix(prefix))
                .unwrap_or(&lowered);
            title_case(stripped)
        }
    }
}

fn title_case(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display symbol for a currency or crypto code. Unknown codes are returned as-is.
pub fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "ISK" | "SEK" | "NOK" | "DKK" => "kr",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        "AUD" => "A$",
        "CAD" => "C$",
        "CHF" => "CHF",
        "INR" => "₹",
        "RUB" => "₽",
        "KRW" => "₩",
        "BRL" => "R$",
        "ZAR" => "R",
        "bitcoin" => "₿",
        "ethereum" => "Ξ",
        "litecoin" => "Ł",
        "dogecoin" => "Ð",
        "tether" => "₮",
        "cardano" => "₳",
        "polkadot" => "●",
        "solana" => "◎",
        "stellar" => "✦",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_names() {
        assert_eq!(display_name(AssetClass::Currency, "USD"), "US Dollar");
        assert_eq!(display_name(AssetClass::Crypto, "bitcoin"), "Bitcoin");
        assert_eq!(display_name(AssetClass::Metal, "gold"), "Gold");
    }

    #[test]
    fn test_fallback_names() {
        assert_eq!(display_name(AssetClass::Currency, "XYZ"), "XYZ");
        assert_eq!(
            display_name(AssetClass::Crypto, "wrapped-bitcoin"),
            "Wrapped Bitcoin"
        );
        assert_eq!(
            display_name(AssetClass::Crypto, "curve-dao-token"),
            "Curve Dao Token"
        );
        assert_eq!(display_name(AssetClass::Metal, "lbma_gold"), "Gold");
        assert_eq!(display_name(AssetClass::Metal, "lme_copper"), "Copper");
        assert_eq!(display_name(AssetClass::Metal, "aluminum"), "Aluminum");
    }

    #[test]
    fn test_same_code_in_two_classes_is_distinct() {
        let currency = Asset::new(AssetClass::Currency, "gold", 1.0);
        let metal = Asset::new(AssetClass::Metal, "gold", 1.0);
        assert_ne!(currency.key(), metal.key());
    }

    #[test]
    fn test_asset_class_from_str() {
        assert_eq!("Crypto".parse::<AssetClass>().unwrap(), AssetClass::Crypto);
        assert_eq!("metal".parse::<AssetClass>().unwrap(), AssetClass::Metal);
        assert_eq!(
            "CURRENCY".parse::<AssetClass>().unwrap(),
            AssetClass::Currency
        );
        assert!("stocks".parse::<AssetClass>().is_err());
    }

    #[test]
    fn test_currency_symbol() {
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("bitcoin"), "₿");
        assert_eq!(currency_symbol("gold"), "gold");
    }
}
