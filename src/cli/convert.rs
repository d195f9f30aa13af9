use super::ui;
use crate::core::asset::{AssetClass, currency_symbol, display_name};
use crate::core::conversion::{ConverterState, UNAVAILABLE, format_grouped, parse_amount};
use crate::core::rates::RateSnapshot;
use crate::core::visual::Visual;
use crate::visuals::VisualResolver;
use anyhow::Result;
use comfy_table::Cell;

/// Attaches the unit a converted value is expressed in.
fn with_unit(value: &str, state: &ConverterState, snapshot: &RateSnapshot) -> String {
    if value == UNAVAILABLE {
        return value.to_string();
    }
    let target = state.target();
    let grouped = format_grouped(value);
    match target.class {
        AssetClass::Currency => format!("{} {grouped}", currency_symbol(&target.code)),
        AssetClass::Crypto => format!("{grouped} {}", currency_symbol(&target.code)),
        AssetClass::Metal => format!("{grouped} {}", snapshot.metal.meta.unit),
    }
}

pub fn render(state: &ConverterState, snapshot: &RateSnapshot, visual: &Visual) -> String {
    let base = &snapshot.fiat.base;
    let target = state.target();
    let converted = state.converted(snapshot);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(&format!("Amount ({base})")),
        ui::header_cell("Target"),
        ui::header_cell("Result"),
        ui::header_cell("Icon"),
    ]);
    table.add_row(vec![
        ui::amount_cell(&format_grouped(&parse_amount(state.amount_text()).to_string())),
        Cell::new(format!(
            "{} ({}, {})",
            display_name(target.class, &target.code),
            target.code,
            target.class
        )),
        ui::amount_cell(&with_unit(&converted, state, snapshot)),
        ui::visual_cell(visual, &target.code),
    ]);

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Conversion", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());

    if converted == UNAVAILABLE {
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!("No usable rate for {}", target.code),
                ui::StyleType::Subtle
            )
        ));
    }
    output
}

pub async fn run(
    state: &ConverterState,
    snapshot: &RateSnapshot,
    resolver: &VisualResolver,
) -> Result<()> {
    let resolved = resolver.resolve_for(state.target().clone()).await;
    let visual = state.accept_visual(resolved).unwrap_or(Visual::Empty);
    println!("{}", render(state, snapshot, &visual));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::AssetKey;
    use crate::core::rates::tests::sample_snapshot;

    #[test]
    fn test_render_default_state() {
        let snapshot = sample_snapshot();
        let output = render(&ConverterState::default(), &snapshot, &Visual::Empty);

        assert!(output.contains("Amount (ISK)"));
        assert!(output.contains("US Dollar (USD, Currency)"));
        assert!(output.contains("$ 7,20"));
        assert!(output.contains("US"));
    }

    #[test]
    fn test_render_metal_uses_unit() {
        let snapshot = sample_snapshot();
        let state = ConverterState::new("1000", AssetKey::new(AssetClass::Metal, "gold"));
        let output = render(&state, &snapshot, &Visual::Color("#FFD700".to_string()));

        assert!(output.contains("0,1176 g"));
        assert!(output.contains("#FFD700"));
    }

    #[test]
    fn test_render_missing_rate() {
        let snapshot = sample_snapshot();
        let state = ConverterState::new("1000", AssetKey::new(AssetClass::Crypto, "dogecoin"));
        let output = render(&state, &snapshot, &Visual::Empty);

        assert!(output.contains("No usable rate for dogecoin"));
    }
}
