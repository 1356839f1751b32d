use super::core::{DataMap, RenderContext, Renderer};
use crate::error::FormatError;

/// Compact JSON encoding of the data mapping, no special cases.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, data: &DataMap, _ctx: &RenderContext<'_>) -> Result<String, FormatError> {
        Ok(serde_json::to_string(data)?)
    }
}
