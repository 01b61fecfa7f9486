use crate::error::Result;
use crate::layer::LayerKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Free-form property bag attached to elements and relationships
pub type Properties = Map<String, Value>;

/// A layered architecture model, read-only input to the graph builder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    /// Layers keyed by name (e.g. "business", "application")
    #[serde(default)]
    pub layers: BTreeMap<String, Layer>,
}

impl ArchitectureModel {
    /// Parse a model from its JSON document
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read and parse a model file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let model = Self::from_json_str(&raw)?;
        log::debug!(
            "Loaded architecture model from {}: {} layers, {} elements",
            path.as_ref().display(),
            model.layers.len(),
            model.element_count()
        );
        Ok(model)
    }

    /// Layers in name order together with their classified kind
    pub fn layers_with_kind(&self) -> impl Iterator<Item = (&str, LayerKind, &Layer)> {
        self.layers
            .iter()
            .map(|(name, layer)| (name.as_str(), layer.kind(name), layer))
    }

    pub fn element_count(&self) -> usize {
        self.layers.values().map(|l| l.elements.len()).sum()
    }
}

/// One layer of the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    #[serde(default)]
    pub id: String,

    /// Declared layer type (e.g. "Application", "datastore")
    #[serde(rename = "type", default)]
    pub layer_type: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub elements: Vec<Element>,

    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Layer {
    /// Classify this layer by its declared type, falling back to the map key
    /// when the declared type is missing or unrecognized
    pub fn kind(&self, key: &str) -> LayerKind {
        match LayerKind::from_declared(&self.layer_type) {
            LayerKind::Other => LayerKind::from_declared(key),
            kind => kind,
        }
    }
}

/// An element inside a layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,

    /// Declared element type (e.g. "service", "component", "actor")
    #[serde(rename = "type", default)]
    pub element_type: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub properties: Properties,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incoming_relationships: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outgoing_relationships: Vec<String>,
}

impl Element {
    /// Description from the dedicated field, or from `properties.description`
    pub fn description(&self) -> &str {
        self.description
            .as_deref()
            .or_else(|| self.properties.get("description").and_then(Value::as_str))
            .unwrap_or_default()
    }

    /// Display name, falling back to the id for unnamed elements
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Lowercased declared type
    pub fn type_lower(&self) -> String {
        self.element_type.to_ascii_lowercase()
    }

    /// First string value among the given property keys (case-insensitive)
    pub fn property_str(&self, keys: &[&str]) -> Option<&str> {
        property_str(&self.properties, keys)
    }

    /// All string values among the given property keys; arrays are flattened
    pub fn property_strings(&self, keys: &[&str]) -> Vec<String> {
        property_strings(&self.properties, keys)
    }

    /// Name, description and serialized properties joined for keyword matching
    pub fn search_text(&self) -> String {
        let props = if self.properties.is_empty() {
            String::new()
        } else {
            Value::Object(self.properties.clone()).to_string()
        };
        format!("{} {} {}", self.name, self.description(), props)
    }
}

/// A relationship between two elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type", default)]
    pub relationship_type: String,

    #[serde(alias = "sourceId", alias = "source_id")]
    pub source: String,

    #[serde(alias = "targetId", alias = "target_id")]
    pub target: String,

    #[serde(default)]
    pub properties: Properties,
}

impl Relationship {
    /// Relationship type lowercased with separators removed ("runs-on" -> "runson")
    pub fn normalized_type(&self) -> String {
        normalize_token(&self.relationship_type)
    }

    pub fn property_str(&self, keys: &[&str]) -> Option<&str> {
        property_str(&self.properties, keys)
    }

    /// Stable id, synthesized from the endpoints when the model leaves it blank
    pub fn stable_id(&self) -> String {
        if self.id.trim().is_empty() {
            format!("{}->{}:{}", self.source, self.target, self.normalized_type())
        } else {
            self.id.clone()
        }
    }
}

/// Lowercase and drop `-`, `_` and whitespace
pub fn normalize_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' ' | '\t'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn lookup<'a>(properties: &'a Properties, key: &str) -> Option<&'a Value> {
    properties.get(key).or_else(|| {
        let wanted = normalize_token(key);
        properties
            .iter()
            .find(|(k, _)| normalize_token(k) == wanted)
            .map(|(_, v)| v)
    })
}

pub(crate) fn property_str<'a>(properties: &'a Properties, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| lookup(properties, key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
            Value::Array(items) => items.iter().find_map(Value::as_str),
            _ => None,
        })
}

pub(crate) fn property_strings(properties: &Properties, keys: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for key in keys {
        match lookup(properties, key) {
            Some(Value::String(s)) if !s.trim().is_empty() => out.push(s.clone()),
            Some(Value::Array(items)) => {
                out.extend(items.iter().filter_map(Value::as_str).map(str::to_string))
            }
            _ => {}
        }
    }
    out
}
