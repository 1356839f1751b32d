use serde_json::{json, Value};

use crate::dispatcher::{Resource, RestContext};
use crate::error::RestError;
use crate::format::ResponseEnvelope;

/// Resource that answers every action with what it was asked.
///
/// Used by the `request` CLI command. An `index` request with no parameters
/// answers with empty data, which the formatter turns into a 404.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoResource;

impl EchoResource {
    fn echo(ctx: &RestContext<'_>, code: u16) -> ResponseEnvelope {
        ResponseEnvelope::from_value(
            code,
            json!({
                "action": ctx.state.action.as_str(),
                "method": ctx.state.method.as_str(),
                "path": ctx.request.path,
                "params": Value::Object(ctx.params().clone()),
            }),
        )
    }
}

impl Resource for EchoResource {
    fn index(&self, ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
        if ctx.params().is_empty() {
            return Ok(ResponseEnvelope::ok(Default::default()));
        }
        Ok(Self::echo(ctx, 200))
    }

    fn create(&self, ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
        Ok(Self::echo(ctx, 201))
    }

    fn update(&self, ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
        Ok(Self::echo(ctx, 200))
    }

    fn delete(&self, ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
        Ok(Self::echo(ctx, 200))
    }
}
