//! Core domain: assets, rates, catalog, conversion and visuals

pub mod asset;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod conversion;
pub mod error;
pub mod log;
pub mod rates;
pub mod visual;

// Re-export main types for cleaner imports
pub use asset::{Asset, AssetClass, AssetKey};
pub use error::RatesError;
pub use rates::{
    CryptoRateProvider, CryptoRates, FiatRateProvider, FiatRates, MetalMeta, MetalRateProvider,
    MetalRates, RateSnapshot, RateTable, load_snapshot,
};
pub use visual::{ResolvedVisual, Visual};
