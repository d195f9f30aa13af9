use crate::core::asset::AssetClass;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RatesError {
    /// One or more providers failed; no partial snapshot is produced.
    #[error("Exchange rates unavailable ({})", join_classes(.classes))]
    Unavailable { classes: Vec<AssetClass> },
}

fn join_classes(classes: &[AssetClass]) -> String {
    classes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_message_names_every_class() {
        let err = RatesError::Unavailable {
            classes: vec![AssetClass::Crypto, AssetClass::Metal],
        };
        assert_eq!(err.to_string(), "Exchange rates unavailable (Crypto, Metal)");
    }
}
