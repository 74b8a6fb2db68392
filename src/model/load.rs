use super::types::MetadataModel;
use anyhow::Context;
use std::path::Path;

/// Load a serialized metadata model. Files ending in `.yaml`/`.yml` are read
/// as YAML, everything else as JSON.
pub fn load_model(file_path: impl AsRef<Path>) -> anyhow::Result<MetadataModel> {
    let file_path = file_path.as_ref();
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read metadata model {}", file_path.display()))?;

    let is_yaml = matches!(
        file_path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let model = if is_yaml {
        model_from_yaml(&content)?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid metadata model {}", file_path.display()))?
    };

    tracing::debug!(
        path = %file_path.display(),
        records = model.records.len(),
        aliases = model.aliases.len(),
        "Metadata model loaded"
    );
    Ok(model)
}

pub fn model_from_yaml(content: &str) -> anyhow::Result<MetadataModel> {
    Ok(serde_yaml::from_str(content)?)
}
