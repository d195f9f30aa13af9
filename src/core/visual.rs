//! Visual representation of an asset: an icon URL or a flat color.

use crate::core::asset::AssetKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visual {
    Url(String),
    Color(String),
    /// Nothing resolved; the UI shows [`Visual::placeholder`] instead.
    Empty,
}

impl Visual {
    /// First two characters of the code, shown when no icon is available.
    pub fn placeholder(code: &str) -> String {
        code.chars().take(2).collect()
    }
}

/// A visual together with the asset it was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVisual {
    pub key: AssetKey,
    pub visual: Visual,
}

pub const DEFAULT_METAL_COLOR: &str = "#B0B0B0";

/// Checked in order; the first name contained in the code wins.
const METAL_PALETTE: [(&str, &str); 13] = [
    ("gold", "#FFD700"),
    ("silver", "#C0C0C0"),
    ("platinum", "#E5E4E2"),
    ("palladium", "#CED0DD"),
    ("copper", "#B87333"),
    ("aluminum", "#D3D3D3"),
    ("lead", "#2C3539"),
    ("nickel", "#727472"),
    ("zinc", "#A9A9A9"),
    ("xau", "#FFD700"),
    ("xag", "#C0C0C0"),
    ("xpt", "#E5E4E2"),
    ("xpd", "#CED0DD"),
];

pub fn metal_color(code: &str) -> &'static str {
    let code = code.to_lowercase();
    METAL_PALETTE
        .iter()
        .find(|(metal, _)| code.contains(metal))
        .map_or(DEFAULT_METAL_COLOR, |(_, color)| *color)
}

/// Country segment for a currency flag. Unknown codes fall back to the lowercased code.
pub fn country_code(currency: &str) -> String {
    let country = match currency.to_uppercase().as_str() {
        "USD" => "us",
        "EUR" => "eu",
        "ISK" => "is",
        "GBP" => "gb",
        "JPY" => "jp",
        "AUD" => "au",
        "CAD" => "ca",
        "CHF" => "ch",
        "SEK" => "se",
        "NOK" => "no",
        "DKK" => "dk",
        "INR" => "in",
        "CNY" => "cn",
        "RUB" => "ru",
        "KRW" => "kr",
        "BRL" => "br",
        "ZAR" => "za",
        _ => return currency.to_lowercase(),
    };
    country.to_string()
}

pub fn flag_url(flags_base_url: &str, currency: &str) -> String {
    format!(
        "{}/{}.svg",
        flags_base_url.trim_end_matches('/'),
        country_code(currency)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metal_color() {
        assert_eq!(metal_color("gold"), "#FFD700");
        assert_eq!(metal_color("lbma_gold"), "#FFD700");
        assert_eq!(metal_color("SILVER"), "#C0C0C0");
        assert_eq!(metal_color("XPD"), "#CED0DD");
        assert_eq!(metal_color("lme_copper"), "#B87333");
        assert_eq!(metal_color("rhodium"), DEFAULT_METAL_COLOR);
    }

    #[test]
    fn test_flag_url() {
        assert_eq!(
            flag_url("https://flagcdn.com", "ISK"),
            "https://flagcdn.com/is.svg"
        );
        assert_eq!(
            flag_url("https://flagcdn.com/", "eur"),
            "https://flagcdn.com/eu.svg"
        );
        // Best effort for codes outside the lookup table
        assert_eq!(
            flag_url("https://flagcdn.com", "PLN"),
            "https://flagcdn.com/pln.svg"
        );
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(Visual::placeholder("bitcoin"), "bi");
        assert_eq!(Visual::placeholder("X"), "X");
    }
}
