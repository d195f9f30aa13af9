use super::ui;
use crate::core::asset::Asset;
use crate::core::catalog::{AssetFilter, SortKey, build_catalog, filter, sort};
use crate::core::rates::RateSnapshot;
use crate::core::visual::Visual;
use crate::visuals::VisualResolver;
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;
use futures::future::join_all;

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub filter: AssetFilter,
    pub search: String,
    pub sort: SortKey,
    pub limit: Option<usize>,
    pub icons: bool,
}

/// Catalog view after filtering, sorting and truncation.
pub fn select(snapshot: &RateSnapshot, options: &ListOptions) -> Vec<Asset> {
    let catalog = build_catalog(snapshot);
    let mut assets = sort(filter(&catalog, options.filter, &options.search), options.sort);
    if let Some(limit) = options.limit {
        assets.truncate(limit);
    }
    assets
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or("unknown".to_string(), |ts| {
        ts.format("%Y-%m-%d %H:%M UTC").to_string()
    })
}

pub fn render(assets: &[Asset], visuals: Option<&[Visual]>, snapshot: &RateSnapshot) -> String {
    let mut table = ui::new_styled_table();
    let mut header = vec![
        ui::header_cell("Code"),
        ui::header_cell("Name"),
        ui::header_cell("Class"),
        ui::header_cell("Rate"),
    ];
    if visuals.is_some() {
        header.push(ui::header_cell("Icon"));
    }
    table.set_header(header);

    for (i, asset) in assets.iter().enumerate() {
        let mut row = vec![
            Cell::new(&asset.code),
            Cell::new(&asset.display_name),
            Cell::new(asset.class.to_string()),
            ui::amount_cell(&asset.unit_value.to_string()),
        ];
        if let Some(visual) = visuals.and_then(|visuals| visuals.get(i)) {
            row.push(ui::visual_cell(visual, &asset.code));
        }
        table.add_row(row);
    }

    let mut output = format!(
        "{}\n\n",
        ui::style_text(
            &format!("Assets ({})", assets.len()),
            ui::StyleType::Title
        )
    );
    output.push_str(&table.to_string());

    let meta = &snapshot.metal.meta;
    output.push_str(&format!(
        "\n\n{}",
        ui::style_text(
            &format!(
                "Fiat per 1 {} (updated {}); crypto in {}; metals in {} per {} (updated {})",
                snapshot.fiat.base,
                format_timestamp(snapshot.fiat.updated_at),
                snapshot.crypto.quote_currency,
                meta.currency,
                meta.unit,
                format_timestamp(meta.metal_timestamp),
            ),
            ui::StyleType::Subtle
        )
    ));
    output
}

/// Resolves icons for every asset, in list order, through the shared queue.
async fn resolve_visuals(assets: &[Asset], resolver: &VisualResolver) -> Vec<Visual> {
    let pb = ui::new_progress_bar(assets.len() as u64, true);
    pb.set_message("Resolving icons...");

    let futures = assets.iter().map(|asset| {
        let pb_clone = pb.clone();
        async move {
            let visual = resolver.resolve(&asset.code, asset.class).await;
            pb_clone.inc(1);
            visual
        }
    });

    let visuals = join_all(futures).await;
    pb.finish_and_clear();
    visuals
}

pub async fn run(
    snapshot: &RateSnapshot,
    options: &ListOptions,
    resolver: &VisualResolver,
) -> Result<()> {
    let assets = select(snapshot, options);
    if assets.is_empty() {
        println!("No assets match the current filter.");
        return Ok(());
    }

    let visuals = if options.icons {
        Some(resolve_visuals(&assets, resolver).await)
    } else {
        None
    };

    println!("{}", render(&assets, visuals.as_deref(), snapshot));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::AssetClass;
    use crate::core::rates::tests::sample_snapshot;

    #[test]
    fn test_select_filters_sorts_and_limits() {
        let snapshot = sample_snapshot();
        let options = ListOptions {
            filter: AssetFilter::Only(AssetClass::Crypto),
            sort: SortKey::PriceLow,
            limit: Some(2),
            ..Default::default()
        };

        let codes: Vec<_> = select(&snapshot, &options)
            .into_iter()
            .map(|asset| asset.code)
            .collect();
        assert_eq!(codes, vec!["shiba-inu", "ethereum"]);
    }

    #[test]
    fn test_select_search_by_name() {
        let snapshot = sample_snapshot();
        let options = ListOptions {
            search: "dollar".to_string(),
            ..Default::default()
        };

        let codes: Vec<_> = select(&snapshot, &options)
            .into_iter()
            .map(|asset| asset.code)
            .collect();
        assert_eq!(codes, vec!["USD"]);
    }

    #[test]
    fn test_render_includes_metadata() {
        let snapshot = sample_snapshot();
        let assets = select(&snapshot, &ListOptions::default());
        let output = render(&assets, None, &snapshot);

        assert!(output.contains("Assets (9)"));
        assert!(output.contains("Bitcoin"));
        assert!(output.contains("metals in ISK per g"));
        assert!(!output.contains("Icon"));
    }

    #[test]
    fn test_render_with_icons() {
        let snapshot = sample_snapshot();
        let assets = select(
            &snapshot,
            &ListOptions {
                filter: AssetFilter::Only(AssetClass::Metal),
                ..Default::default()
            },
        );
        let visuals: Vec<_> = assets
            .iter()
            .map(|asset| Visual::Color(crate::core::visual::metal_color(&asset.code).to_string()))
            .collect();
        let output = render(&assets, Some(&visuals), &snapshot);

        assert!(output.contains("Icon"));
        assert!(output.contains("#FFD700"));
        assert!(output.contains("#C0C0C0"));
    }
}
