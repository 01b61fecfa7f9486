use crate::types::normalize_token;
use serde::{Deserialize, Serialize};

/// Kind of an architecture layer, derived from its declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    Motivation,
    Business,
    Security,
    Application,
    Technology,
    Api,
    DataModel,
    Datastore,
    Other,
}

/// Declared layer-type spellings, compared after normalization
const LAYER_ALIASES: &[(&[&str], LayerKind)] = &[
    (&["motivation", "motivationlayer"], LayerKind::Motivation),
    (&["business", "businesslayer"], LayerKind::Business),
    (&["security", "securitylayer"], LayerKind::Security),
    (&["application", "applicationlayer", "app"], LayerKind::Application),
    (
        &["technology", "technologylayer", "infrastructure", "tech"],
        LayerKind::Technology,
    ),
    (&["api", "apis", "apilayer", "interface"], LayerKind::Api),
    (&["datamodel", "datamodellayer", "schema"], LayerKind::DataModel),
    (
        &["datastore", "datastores", "datastorelayer", "database", "storage"],
        LayerKind::Datastore,
    ),
];

impl LayerKind {
    /// Classify a declared layer type; unknown spellings map to `Other`
    pub fn from_declared(raw: &str) -> Self {
        let token = normalize_token(raw);
        LAYER_ALIASES
            .iter()
            .find(|(aliases, _)| aliases.contains(&token.as_str()))
            .map(|(_, kind)| *kind)
            .unwrap_or(LayerKind::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_common_spellings() {
        assert_eq!(LayerKind::from_declared("Application"), LayerKind::Application);
        assert_eq!(LayerKind::from_declared("data-store"), LayerKind::Datastore);
        assert_eq!(LayerKind::from_declared("Data_Model"), LayerKind::DataModel);
        assert_eq!(LayerKind::from_declared("APIs"), LayerKind::Api);
        assert_eq!(LayerKind::from_declared("ux"), LayerKind::Other);
    }
}
