//! # Response Formatting
//!
//! Turns a [`ResponseEnvelope`] (intended status + data mapping) into a
//! response body in the output format selected for the request.
//!
//! Built-in formats:
//!
//! | format | content type       | renderer          |
//! |--------|--------------------|-------------------|
//! | `json` | `application/json` | [`JsonRenderer`]  |
//! | `xml`  | `text/xml`         | [`XmlRenderer`]   |
//! | `html` | `text/html`        | [`HtmlRenderer`]  |
//!
//! Further formats can be registered on a [`ResponseFormatter`]. Requesting a
//! format with no renderer is fatal for the request (see
//! [`FormatError`](crate::error::FormatError)).

mod core;
mod html;
mod json;
mod mime;
mod xml;

pub use core::{
    is_valid_attachment_name, DataMap, RenderContext, Renderer, ResponseEnvelope,
    ResponseFormatter, NO_RECORDS_MESSAGE,
};
pub use html::{HtmlRenderer, RenderOutcome};
pub use json::JsonRenderer;
pub use mime::mime_by_ext;
pub use xml::XmlRenderer;
