use serde_json::Value;

/// Serialization collaborator for method return values.
pub trait Encoder: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn encode(&self, value: &Value) -> anyhow::Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode(&self, value: &Value) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }
}
