use crate::error::{Result, SplitError};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    pub stems: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Registry {
    pub default: String,
    pub models: Vec<RegistryEntry>,
}

const REGISTRY_JSON: &str = include_str!("../../models/registry.json");

fn load() -> Result<Registry> {
    serde_json::from_str(REGISTRY_JSON)
        .map_err(|e| SplitError::invalid(format!("bundled model registry is malformed: {e}")))
}

/// Known models, in registry order, plus the name of the default one.
pub fn list_models() -> Result<(Vec<RegistryEntry>, String)> {
    let reg = load()?;
    Ok((reg.models, reg.default))
}

/// Stem names a model writes. An empty name selects the registry default.
pub fn resolve_stems(model_name: &str) -> Result<Vec<String>> {
    let reg = load()?;
    let target = if model_name.is_empty() {
        reg.default
    } else {
        model_name.to_string()
    };

    reg.models
        .into_iter()
        .find(|m| m.name == target)
        .map(|m| m.stems)
        .ok_or_else(|| {
            SplitError::invalid(format!(
                "model `{target}` is not in the registry; pass --stems to name its outputs"
            ))
        })
}
