//! URL-encoded parameter parsing with bracket nesting.
//!
//! Keys may carry a bracket path: `filter[name]=rex` becomes
//! `{"filter": {"name": "rex"}}` and `tag[]=a&tag[]=b` becomes
//! `{"tag": {"0": "a", "1": "b"}}`. A later pair with the same key replaces the
//! earlier value in place.

use serde_json::{Map, Value};
use tracing::debug;

use super::ParamMap;

/// Deepest bracket nesting accepted in a key; deeper pairs are dropped.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parse an `application/x-www-form-urlencoded` string (or body) into a [`ParamMap`].
///
/// Pairs whose base name is empty (`[x]=1`, `=1`) are dropped, as are keys
/// nested deeper than [`MAX_NESTING_DEPTH`] brackets. A key with an
/// unterminated bracket is kept literally.
pub fn parse_form<T: AsRef<[u8]>>(input: T) -> ParamMap {
    let mut params = ParamMap::new();
    for (key, value) in url::form_urlencoded::parse(input.as_ref()) {
        let Some((base, path)) = split_key(&key) else {
            continue;
        };
        insert_path(&mut params, base.to_string(), &path, Value::String(value.into_owned()));
    }
    params
}

/// Parse the query component of a request path (everything after `?`).
///
/// # Arguments
///
/// * `path` - The full URL path (e.g., `/users?limit=10&offset=20`)
pub fn parse_query_params(path: &str) -> ParamMap {
    match path.split_once('?') {
        Some((_, query)) => parse_form(query),
        None => ParamMap::new(),
    }
}

/// Split `a[b][c]` into `("a", ["b", "c"])`.
fn split_key(key: &str) -> Option<(&str, Vec<&str>)> {
    let (base, mut rest) = match key.find('[') {
        Some(idx) => (&key[..idx], &key[idx..]),
        None => (key, ""),
    };
    if base.is_empty() {
        return None;
    }

    let mut path = Vec::new();
    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(end) => {
                if path.len() == MAX_NESTING_DEPTH {
                    debug!(key_len = key.len(), "Form key nested too deep - pair dropped");
                    return None;
                }
                path.push(&stripped[..end]);
                rest = &stripped[end + 1..];
            }
            None => return Some((key, Vec::new())),
        }
    }
    // Trailing garbage after the last bracket is ignored.
    Some((base, path))
}

fn insert_path(map: &mut ParamMap, key: String, path: &[&str], value: Value) {
    let Some((next, rest)) = path.split_first() else {
        map.insert(key, value);
        return;
    };

    let slot = map
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(inner) = slot {
        let child = if next.is_empty() {
            match next_index(inner) {
                Some(index) => index.to_string(),
                None => {
                    debug!("No free append index left - pair dropped");
                    return;
                }
            }
        } else {
            (*next).to_string()
        };
        insert_path(inner, child, rest, value);
    }
}

/// Next free numeric key for `name[]` appends; `None` once `u64::MAX` is taken.
fn next_index(map: &ParamMap) -> Option<u64> {
    match map.keys().filter_map(|k| k.parse::<u64>().ok()).max() {
        Some(max) => max.checked_add(1),
        None => Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_pairs() {
        let p = parse_form("a=1&b=two+words&c=%2Fslash");
        assert_eq!(Value::Object(p), json!({"a": "1", "b": "two words", "c": "/slash"}));
    }

    #[test]
    fn test_later_pair_wins_in_place() {
        let p = parse_form("a=1&b=2&a=3");
        let keys: Vec<&String> = p.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(p["a"], json!("3"));
    }

    #[test]
    fn test_nested_brackets() {
        let p = parse_form("filter[name]=rex&filter[age][min]=2");
        assert_eq!(
            Value::Object(p),
            json!({"filter": {"name": "rex", "age": {"min": "2"}}})
        );
    }

    #[test]
    fn test_append_brackets() {
        let p = parse_form("tag[]=a&tag[]=b&tag[]=c");
        assert_eq!(Value::Object(p), json!({"tag": {"0": "a", "1": "b", "2": "c"}}));
    }

    #[test]
    fn test_scalar_replaced_by_nested() {
        let p = parse_form("a=1&a[b]=2");
        assert_eq!(Value::Object(p), json!({"a": {"b": "2"}}));
    }

    #[test]
    fn test_empty_base_dropped() {
        let p = parse_form("[x]=1&=2&ok=3");
        assert_eq!(Value::Object(p), json!({"ok": "3"}));
    }

    #[test]
    fn test_unterminated_bracket_kept_literally() {
        let p = parse_form("a[b=1");
        assert_eq!(p.get("a[b"), Some(&json!("1")));
    }

    #[test]
    fn test_append_after_max_index_is_dropped() {
        let p = parse_form("a[18446744073709551615]=x&a[]=y&b=1");
        assert_eq!(
            Value::Object(p),
            json!({"a": {"18446744073709551615": "x"}, "b": "1"})
        );
    }

    #[test]
    fn test_deeply_nested_key_is_dropped() {
        let body = format!("a{}=1&ok=2", "[]".repeat(200_000));
        let p = parse_form(&body);
        assert_eq!(Value::Object(p), json!({"ok": "2"}));
    }

    #[test]
    fn test_nesting_at_limit_is_kept() {
        let key = format!("a{}", "[x]".repeat(MAX_NESTING_DEPTH));
        let p = parse_form(format!("{key}=1"));
        let mut node = &p["a"];
        for _ in 1..MAX_NESTING_DEPTH {
            node = &node["x"];
        }
        assert_eq!(node["x"], json!("1"));
    }

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/p?x=1&y=2");
        assert_eq!(q.get("x"), Some(&json!("1")));
        assert_eq!(q.get("y"), Some(&json!("2")));
        assert!(parse_query_params("/p").is_empty());
    }
}
