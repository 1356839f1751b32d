//! HTML output through named views.
//!
//! View selection:
//!
//! - data carrying an `error` field renders the `error` view, with
//!   `responseCode` set to the intended status code, even when the transport
//!   status is suppressed to `200`;
//! - otherwise `<directory>/<controller>` (lower-cased, the directory part only
//!   when non-empty), falling back to `<directory>/<controller>/<action>` when
//!   the first view does not exist.
//!
//! The view receives `{"data": <mapping>}`. HTML is best effort: any failure
//! yields an empty body rather than an error.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use super::core::{DataMap, RenderContext, Renderer};
use crate::error::{FormatError, ViewError};
use crate::views::{ViewEngine, ERROR_VIEW};

/// Result of an HTML render attempt.
#[derive(Debug)]
pub enum RenderOutcome {
    Rendered(String),
    /// Rendering failed; the response body is empty.
    Fallback(ViewError),
}

impl RenderOutcome {
    /// Body to send: the rendered markup, or an empty string on fallback.
    #[must_use]
    pub fn into_body(self) -> String {
        match self {
            RenderOutcome::Rendered(body) => body,
            RenderOutcome::Fallback(_) => String::new(),
        }
    }
}

/// Renders the `html` format with an optional [`ViewEngine`].
#[derive(Clone, Default)]
pub struct HtmlRenderer {
    views: Option<Arc<dyn ViewEngine>>,
}

impl std::fmt::Debug for HtmlRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlRenderer")
            .field("has_views", &self.views.is_some())
            .finish()
    }
}

impl HtmlRenderer {
    #[must_use]
    pub fn new(views: Option<Arc<dyn ViewEngine>>) -> Self {
        Self { views }
    }

    /// Pick a view and render it.
    pub fn render_view(&self, data: &DataMap, ctx: &RenderContext<'_>) -> RenderOutcome {
        let Some(views) = self.views.as_deref() else {
            return RenderOutcome::Fallback(ViewError::NotFound("no view engine configured".into()));
        };

        let mut data = data.clone();
        let name = if data.contains_key("error") {
            data.insert("responseCode".to_string(), json!(ctx.code));
            ERROR_VIEW.to_string()
        } else {
            let base = controller_view_name(ctx);
            if views.exists(&base) {
                base
            } else {
                format!("{base}/{}", ctx.action)
            }
        };

        debug!(view = %name, "Rendering HTML view");
        match views.render(&name, &data) {
            Ok(body) => RenderOutcome::Rendered(body),
            Err(e) => RenderOutcome::Fallback(e),
        }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, data: &DataMap, ctx: &RenderContext<'_>) -> Result<String, FormatError> {
        let outcome = self.render_view(data, ctx);
        if let RenderOutcome::Fallback(e) = &outcome {
            warn!(error = %e, "HTML view unavailable - sending empty body");
        }
        Ok(outcome.into_body())
    }
}

fn controller_view_name(ctx: &RenderContext<'_>) -> String {
    let controller = ctx.route.controller.to_lowercase();
    let directory = ctx.route.directory.to_lowercase();
    if directory.is_empty() {
        controller
    } else {
        format!("{directory}/{controller}")
    }
}
