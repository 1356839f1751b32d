//! XML output.
//!
//! The mapping is written as a single `<data>` element. Nested mappings are
//! walked recursively and every leaf becomes a direct child of `<data>`, named
//! by its own key:
//!
//! ```text
//! {"pet": {"name": "rex", "owner": {"name": "ann"}}}
//!   => <data><name>rex</name><name>ann</name></data>
//! ```
//!
//! Keys repeated across nesting levels therefore produce same-named siblings.
//! Consumers rely on this flat shape, so it is kept as-is. Array items are
//! emitted under the key of the array, and so are the values of a mapping whose
//! keys are all integers (the shape `tag[]=a&tag[]=b` parses into). Characters
//! XML 1.0 cannot carry are removed from text.

use std::borrow::Cow;

use serde_json::Value;

use super::core::{DataMap, RenderContext, Renderer};
use crate::error::FormatError;

/// Renders the `xml` format. Needs the `xml` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlRenderer;

impl Renderer for XmlRenderer {
    #[cfg(feature = "xml")]
    fn render(&self, data: &DataMap, _ctx: &RenderContext<'_>) -> Result<String, FormatError> {
        let leaves = flatten(data);
        if let Some((name, _)) = leaves.iter().find(|(name, _)| !is_valid_xml_name(name)) {
            return Err(FormatError::Xml(format!("invalid element name '{name}'")));
        }
        write_document(&leaves).map_err(|e| FormatError::Xml(e.to_string()))
    }

    #[cfg(not(feature = "xml"))]
    fn render(&self, _data: &DataMap, _ctx: &RenderContext<'_>) -> Result<String, FormatError> {
        Err(FormatError::XmlUnavailable)
    }
}

#[cfg(feature = "xml")]
fn write_document(leaves: &[(&str, Cow<'_, str>)]) -> std::io::Result<String> {
    use quick_xml::events::BytesText;
    use quick_xml::Writer;

    let mut writer = Writer::new(Vec::with_capacity(256));
    writer.create_element("data").write_inner_content(|w| {
        for (name, text) in leaves {
            if text.is_empty() {
                w.create_element(*name).write_empty()?;
            } else {
                w.create_element(*name)
                    .write_text_content(BytesText::new(text))?;
            }
        }
        Ok(())
    })?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Collect `(key, text)` for every leaf, depth first, in map order.
fn flatten(data: &DataMap) -> Vec<(&str, Cow<'_, str>)> {
    let mut leaves = Vec::new();
    for (key, value) in data {
        collect_leaves(key, value, &mut leaves);
    }
    leaves
}

fn collect_leaves<'a>(key: &'a str, value: &'a Value, out: &mut Vec<(&'a str, Cow<'a, str>)>) {
    match value {
        Value::Object(map) if is_index_map(map) => {
            for v in map.values() {
                collect_leaves(key, v, out);
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                collect_leaves(k, v, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_leaves(key, item, out);
            }
        }
        Value::String(s) => out.push((key, xml_text(s))),
        Value::Number(n) => out.push((key, Cow::Owned(n.to_string()))),
        Value::Bool(true) => out.push((key, Cow::Borrowed("1"))),
        Value::Bool(false) | Value::Null => out.push((key, Cow::Borrowed(""))),
    }
}

/// A non-empty mapping keyed only by integers, as produced by `name[]` appends.
fn is_index_map(map: &DataMap) -> bool {
    !map.is_empty()
        && map
            .keys()
            .all(|k| !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()))
}

/// Drop characters outside the XML 1.0 `Char` production.
fn xml_text(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_xml_char) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Simplified XML `Name` production: a letter or `_` first, then letters,
/// digits, `-`, `.` or `_`.
fn is_valid_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_'))
}

#[cfg(all(test, feature = "xml"))]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::server::RouteParams;
    use serde_json::json;

    fn render(value: Value) -> Result<String, FormatError> {
        let Value::Object(map) = value else {
            unreachable!()
        };
        let route = RouteParams::default();
        let ctx = RenderContext {
            status: 200,
            code: 200,
            route: &route,
            action: Action::Index,
        };
        XmlRenderer.render(&map, &ctx)
    }

    #[test]
    fn test_flat_mapping() {
        let out = render(json!({"id": 7, "name": "rex"})).unwrap();
        assert_eq!(out, "<data><id>7</id><name>rex</name></data>");
    }

    #[test]
    fn test_nested_leaves_are_flattened() {
        let out = render(json!({"pet": {"name": "rex", "owner": {"name": "ann"}}})).unwrap();
        assert_eq!(out, "<data><name>rex</name><name>ann</name></data>");
    }

    #[test]
    fn test_arrays_repeat_parent_key() {
        let out = render(json!({"tag": ["a", "b"]})).unwrap();
        assert_eq!(out, "<data><tag>a</tag><tag>b</tag></data>");
    }

    #[test]
    fn test_scalars() {
        let out = render(json!({"yes": true, "no": false, "none": null})).unwrap();
        assert_eq!(out, "<data><yes>1</yes><no/><none/></data>");
    }

    #[test]
    fn test_text_is_escaped() {
        let out = render(json!({"q": "a<b & c"})).unwrap();
        assert_eq!(out, "<data><q>a&lt;b &amp; c</q></data>");
    }

    #[test]
    fn test_index_keyed_mapping_repeats_parent_key() {
        let out = render(json!({"tag": {"0": "a", "1": "b"}})).unwrap();
        assert_eq!(out, "<data><tag>a</tag><tag>b</tag></data>");
    }

    #[test]
    fn test_mixed_keys_still_flatten_by_own_key() {
        let err = render(json!({"tag": {"0": "a", "name": "b"}})).unwrap_err();
        assert!(matches!(err, FormatError::Xml(_)));
    }

    #[test]
    fn test_illegal_control_chars_are_removed() {
        let out = render(json!({"q": "a\u{1}b\u{1f}\tc\u{fffe}"})).unwrap();
        assert_eq!(out, "<data><q>ab\tc</q></data>");
    }

    #[test]
    fn test_invalid_element_name() {
        let err = render(json!({"1st": "x"})).unwrap_err();
        assert!(matches!(err, FormatError::Xml(_)));
    }

    #[test]
    fn test_xml_name_rules() {
        assert!(is_valid_xml_name("responseCode"));
        assert!(is_valid_xml_name("_private.key-1"));
        assert!(!is_valid_xml_name("0"));
        assert!(!is_valid_xml_name("has space"));
        assert!(!is_valid_xml_name(""));
    }
}
