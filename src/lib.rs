pub mod cli;
pub mod core;
pub mod providers;
pub mod visuals;

use crate::cli::list::ListOptions;
use crate::core::asset::AssetKey;
use crate::core::config::AppConfig;
use crate::core::conversion::ConverterState;
use crate::core::rates::{RateSnapshot, load_snapshot};
use crate::providers::ProviderSet;
use crate::visuals::VisualResolver;
use anyhow::{Result, anyhow};
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    /// Convert `amount` (base currency) into `target`; both default to the converter's initial state.
    Convert {
        amount: Option<String>,
        target: Option<AssetKey>,
    },
    List(ListOptions),
    Visual(AssetKey),
}

async fn load_rates(providers: &ProviderSet) -> Result<RateSnapshot> {
    let pb = cli::ui::new_progress_bar(1, true);
    pb.set_message("Fetching rates...");
    let result = load_snapshot(
        providers.fiat.as_ref(),
        providers.crypto.as_ref(),
        providers.metal.as_ref(),
    )
    .await;
    pb.finish_and_clear();

    result.map_err(|e| {
        eprintln!(
            "{}",
            cli::ui::style_text(&e.to_string(), cli::ui::StyleType::Error)
        );
        e.into()
    })
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("gengi starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load_or_default()?,
    };
    debug!(
        base = %config.base_currency,
        currencies = config.currencies.len(),
        crypto_ids = config.crypto_ids.len(),
        offline = config.offline,
        "Loaded config"
    );

    let providers = ProviderSet::from_config(&config)?;
    let resolver = VisualResolver::new(
        providers.images.clone(),
        &config.providers.flags.base_url,
        Duration::from_millis(config.image_spacing_ms),
    );

    match command {
        AppCommand::Convert { amount, target } => {
            let mut state = ConverterState::default();
            if let Some(target) = target {
                state = state.with_target(target);
            }
            if let Some(amount) = amount {
                state = state
                    .with_amount(&amount)
                    .ok_or_else(|| anyhow!("Invalid amount: {amount}"))?;
            }
            let snapshot = load_rates(&providers).await?;
            cli::convert::run(&state, &snapshot, &resolver).await
        }
        AppCommand::List(options) => {
            let snapshot = load_rates(&providers).await?;
            cli::list::run(&snapshot, &options, &resolver).await
        }
        AppCommand::Visual(key) => cli::visual::run(key, &resolver).await,
    }
}
