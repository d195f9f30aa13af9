//! Converts an amount in the base currency into any catalog asset.
//!
//! Conversion is a pure function of the amount text, the target asset and the
//! snapshot. It never fails: missing or unusable rates produce [`UNAVAILABLE`].

use crate::core::asset::{AssetClass, AssetKey};
use crate::core::rates::RateSnapshot;
use crate::core::visual::{ResolvedVisual, Visual};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::debug;

/// Result shown when a conversion cannot be computed.
pub const UNAVAILABLE: &str = "0";

/// Crypto results with more integer digits than this get fewer decimals.
const CRYPTO_WIDE_DIGITS: u32 = 6;

/// `1.000` style input: one `.` between a short leading group and exactly three digits.
fn is_thousands_group(cleaned: &str) -> bool {
    let Some((head, tail)) = cleaned.split_once('.') else {
        return false;
    };
    (1..=3).contains(&head.len())
        && !head.starts_with('0')
        && tail.len() == 3
        && head.chars().chain(tail.chars()).all(|c| c.is_ascii_digit())
}

/// Normalises free-text input to a plain `digits[.digits]` string.
fn normalize_amount(text: &str) -> Option<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '_')
        .collect();

    let decimal_marker = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
        (Some(_), None) => {
            (cleaned.matches('.').count() == 1 && !is_thousands_group(&cleaned)).then_some('.')
        }
        (None, Some(_)) => (cleaned.matches(',').count() == 1).then_some(','),
        (None, None) => None,
    };

    let mut normalized = String::with_capacity(cleaned.len());
    for c in cleaned.chars() {
        match c {
            '0'..='9' => normalized.push(c),
            '.' | ',' if Some(c) == decimal_marker => normalized.push('.'),
            '.' | ',' => {}
            _ => return None,
        }
    }

    if !normalized.chars().any(|c| c.is_ascii_digit()) || normalized.matches('.').count() > 1 {
        return None;
    }
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }
    if normalized.ends_with('.') {
        normalized.pop();
    }
    Some(normalized)
}

/// Malformed text counts as zero; `None` means well-formed but too large for `Decimal`.
fn decimal_amount(text: &str) -> Option<Decimal> {
    match normalize_amount(text) {
        Some(normalized) => Decimal::from_str(&normalized).ok(),
        None => Some(Decimal::ZERO),
    }
}

/// Parses an unsigned decimal leniently. Anything unparseable counts as zero.
pub fn parse_amount(text: &str) -> Decimal {
    decimal_amount(text).unwrap_or(Decimal::ZERO)
}

/// Whether the input field should accept `text` as typed.
pub fn is_acceptable_input(text: &str) -> bool {
    text.trim().is_empty()
        || normalize_amount(text).is_some_and(|normalized| Decimal::from_str(&normalized).is_ok())
}

/// Goes through the shortest round-trip text so `0.0072` stays exactly `0.0072`.
fn rate_to_decimal(rate: f64) -> Option<Decimal> {
    Decimal::from_str(&rate.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(rate))
}

fn try_convert(amount: Decimal, target: &AssetKey, snapshot: &RateSnapshot) -> Option<String> {
    let rate = snapshot.table(target.class).get(&target.code)?;
    if !rate.is_finite() || rate <= 0.0 {
        return None;
    }
    let rate = rate_to_decimal(rate)?;
    if rate.is_zero() {
        return None;
    }

    let (value, decimals) = match target.class {
        AssetClass::Currency => (amount.checked_mul(rate)?, 2),
        AssetClass::Crypto => {
            let value = amount.checked_div(rate)?;
            let wide = Decimal::from(10u64.pow(CRYPTO_WIDE_DIGITS));
            let decimals = if value.trunc().abs() >= wide { 4 } else { 8 };
            (value, decimals)
        }
        // Metals are priced per unit mass, so base amount -> mass divides.
        AssetClass::Metal => (amount.checked_div(rate)?, 4),
    };

    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    Some(format!("{rounded:.prec$}", prec = decimals as usize))
}

/// Converts `amount_text` (base currency) into `target`.
pub fn convert(amount_text: &str, target: &AssetKey, snapshot: &RateSnapshot) -> String {
    match decimal_amount(amount_text).and_then(|amount| try_convert(amount, target, snapshot)) {
        Some(converted) => converted,
        None => {
            debug!(asset = %target, "No usable rate, showing zero");
            UNAVAILABLE.to_string()
        }
    }
}

/// Renders a plain decimal with `.` thousands grouping and a `,` decimal marker.
pub fn format_grouped(text: &str) -> String {
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text, None),
    };

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(text.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    match fraction {
        Some(fraction) => format!("{grouped},{fraction}"),
        None => grouped,
    }
}

/// Preset targets offered next to the converter.
pub fn quick_pick(name: &str) -> Option<AssetKey> {
    match name.to_lowercase().as_str() {
        "bitcoin" | "btc" => Some(AssetKey::new(AssetClass::Crypto, "bitcoin")),
        "gold" => Some(AssetKey::new(AssetClass::Metal, "gold")),
        "eur" => Some(AssetKey::new(AssetClass::Currency, "EUR")),
        _ => None,
    }
}

/// Current amount and target. The converted value is always derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterState {
    amount_text: String,
    target: AssetKey,
}

impl Default for ConverterState {
    fn default() -> Self {
        Self {
            amount_text: "1000".to_string(),
            target: AssetKey::new(AssetClass::Currency, "USD"),
        }
    }
}

impl ConverterState {
    pub fn new(amount_text: &str, target: AssetKey) -> Self {
        Self {
            amount_text: amount_text.to_string(),
            target,
        }
    }

    pub fn amount_text(&self) -> &str {
        &self.amount_text
    }

    pub fn target(&self) -> &AssetKey {
        &self.target
    }

    /// Returns the next state, or `None` when the keystroke is rejected.
    pub fn with_amount(&self, amount_text: &str) -> Option<Self> {
        is_acceptable_input(amount_text).then(|| Self {
            amount_text: amount_text.to_string(),
            target: self.target.clone(),
        })
    }

    pub fn with_target(&self, target: AssetKey) -> Self {
        Self {
            amount_text: self.amount_text.clone(),
            target,
        }
    }

    pub fn converted(&self, snapshot: &RateSnapshot) -> String {
        convert(&self.amount_text, &self.target, snapshot)
    }

    /// Accepts a resolved visual only if it was requested for the current target.
    pub fn accept_visual(&self, resolved: ResolvedVisual) -> Option<Visual> {
        if resolved.key == self.target {
            Some(resolved.visual)
        } else {
            debug!(stale = %resolved.key, current = %self.target, "Dropping stale visual");
            None
        }
    }
}
