use super::ui;
use crate::core::asset::{AssetKey, display_name};
use crate::core::visual::Visual;
use crate::visuals::VisualResolver;
use anyhow::Result;

pub fn render(key: &AssetKey, visual: &Visual) -> String {
    let name = display_name(key.class, &key.code);
    let description = match visual {
        Visual::Url(url) => url.clone(),
        Visual::Color(hex) => format!("color {hex}"),
        Visual::Empty => format!(
            "no icon, placeholder \"{}\"",
            Visual::placeholder(&key.code).to_uppercase()
        ),
    };
    format!(
        "{} ({}): {}",
        ui::style_text(&name, ui::StyleType::Label),
        key,
        ui::style_text(&description, ui::StyleType::Value)
    )
}

pub async fn run(key: AssetKey, resolver: &VisualResolver) -> Result<()> {
    let resolved = resolver.resolve_for(key).await;
    println!("{}", render(&resolved.key, &resolved.visual));
    Ok(())
}
