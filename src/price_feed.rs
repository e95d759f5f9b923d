//! Price Feed Module
//!
//! Typed model of the price oracle payload returned by `query_price_feed`,
//! plus the formatting used to render it as price cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

use crate::config::AssetDecimalsConfig;

/// Number of fractional digits a price is rendered with
pub const PRICE_FRACTION_DIGITS: usize = 6;

/// Decimals of each asset's real-world unit, as listed by the price feed page.
const DEFAULT_ASSET_DECIMALS: &[(&str, u8)] = &[
    ("weth.fakes.testnet", 18),
    ("dai.fakes.testnet", 18),
    ("usdt.fakes.testnet", 6),
    ("wrap.testnet", 18),
    ("usdc.fakes.testnet", 6),
    ("aurora", 18),
    ("wbtc.fakes.testnet", 8),
    ("usdn.testnet", 6),
    ("aurora.fakes.testnet", 18),
    ("woo.orderly.testnet", 18),
    ("fraxtoken.testnet", 18),
    ("s.fraxtoken.testnet", 18),
    // Bridged USDC
    (
        "3e2210e1184b45b64c8a434c0a7e7b23cc04ea7eb7a6c3c32520d03d4afcb8af",
        6,
    ),
];

// ============================================================================
// PRICE DATA STRUCTURES
// ============================================================================

/// Price of an asset: `multiplier / 10^decimals` per smallest asset unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Serialized as a decimal string
    #[serde(with = "dec_format")]
    pub multiplier: u128,
    pub decimals: u8,
}

/// Price entry of one asset; the oracle may have no recent price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetOptionalPrice {
    pub asset_id: String,
    #[serde(default)]
    pub price: Option<Price>,
}

/// Price oracle snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceData {
    /// Nanoseconds since the Unix epoch
    #[serde(with = "dec_format")]
    pub timestamp: u64,
    #[serde(default)]
    pub recency_duration_sec: u32,
    pub prices: Vec<AssetOptionalPrice>,
}

/// One rendered price card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCard {
    pub asset_id: String,
    /// Short label (see [`format_asset_id`])
    pub asset: String,
    /// Formatted price, or "N/A"
    pub price: String,
}

/// Rendered price feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFeedView {
    pub last_updated: String,
    pub cards: Vec<PriceCard>,
}

// ============================================================================
// ASSET DECIMALS
// ============================================================================

/// Lookup table of asset decimals.
#[derive(Debug, Clone)]
pub struct AssetDecimals {
    decimals: HashMap<String, u8>,
}

impl Default for AssetDecimals {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_ASSET_DECIMALS
                .iter()
                .map(|(asset_id, decimals)| (asset_id.to_string(), *decimals))
                .collect(),
        }
    }
}

impl AssetDecimals {
    /// Default table extended (or overridden) by configured entries.
    pub fn with_overrides(overrides: &[AssetDecimalsConfig]) -> Self {
        let mut table = Self::default();
        for entry in overrides {
            table.decimals.insert(entry.asset_id.clone(), entry.decimals);
        }
        table
    }

    pub fn get(&self, asset_id: &str) -> Option<u8> {
        self.decimals.get(asset_id).copied()
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Formats a price in units of the asset: `multiplier * 10^asset_decimals / 10^decimals`.
///
/// Returns "N/A" when there is no price or the asset's decimals are unknown.
pub fn format_price(price: Option<&Price>, asset_decimals: Option<u8>) -> String {
    let (Some(price), Some(asset_decimals)) = (price, asset_decimals) else {
        return "N/A".to_string();
    };

    let value = price.multiplier as f64 * 10f64.powi(i32::from(asset_decimals))
        / 10f64.powi(i32::from(price.decimals));
    format!("{:.*}", PRICE_FRACTION_DIGITS, value)
}

/// Short display label of an asset id.
///
/// The first dot-separated segment, upper-cased; labels longer than five
/// characters are abbreviated to `ABCD...YZ`.
pub fn format_asset_id(asset_id: &str) -> String {
    let id = asset_id
        .split('.')
        .next()
        .unwrap_or_default()
        .to_uppercase();
    let chars: Vec<char> = id.chars().collect();
    if chars.len() > 5 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 2..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        id
    }
}

/// Renders a nanosecond timestamp as a UTC date-time.
pub fn format_timestamp(timestamp_ns: u64) -> String {
    let secs = (timestamp_ns / 1_000_000_000) as i64;
    let nanos = (timestamp_ns % 1_000_000_000) as u32;
    match DateTime::<Utc>::from_timestamp(secs, nanos) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "Invalid Date".to_string(),
    }
}

/// Builds the price cards for a snapshot.
pub fn build_view(data: &PriceData, asset_decimals: &AssetDecimals) -> PriceFeedView {
    let cards = data
        .prices
        .iter()
        .map(|item| PriceCard {
            asset_id: item.asset_id.clone(),
            asset: format_asset_id(&item.asset_id),
            price: format_price(item.price.as_ref(), asset_decimals.get(&item.asset_id)),
        })
        .collect();

    PriceFeedView {
        last_updated: format_timestamp(data.timestamp),
        cards,
    }
}

// ============================================================================
// SERDE HELPERS
// ============================================================================

/// Integers that travel as decimal strings; plain JSON numbers are accepted too.
mod dec_format {
    use super::*;
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNum<T> {
        String(String),
        Num(T),
    }

    pub fn serialize<T: Display, S: Serializer>(num: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&num.to_string())
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr + Deserialize<'de>,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        match StringOrNum::<T>::deserialize(deserializer)? {
            StringOrNum::String(s) => s.parse().map_err(serde::de::Error::custom),
            StringOrNum::Num(n) => Ok(n),
        }
    }
}
