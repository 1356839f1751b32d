//! Named HTML views.
//!
//! A view name such as `admin/users/index` maps to `<views_dir>/admin/users/index.html`,
//! rendered with minijinja. The template sees the response mapping as `data`.
//!
//! The `error` view always exists: when the views directory has no
//! `error.html`, the built-in error page is used.

use std::fs;
use std::path::{Component, Path, PathBuf};

use askama::Template;
use minijinja::Environment;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ViewError;
use crate::format::DataMap;

/// Name of the view used for error responses.
pub const ERROR_VIEW: &str = "error";

/// Lookup and rendering of named views.
pub trait ViewEngine: Send + Sync {
    fn exists(&self, name: &str) -> bool;

    /// Render `name` with the response mapping.
    ///
    /// # Errors
    ///
    /// Unknown view, unreadable file or template failure.
    fn render(&self, name: &str, data: &DataMap) -> Result<String, ViewError>;
}

/// Built-in error page.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorView<'a> {
    code: String,
    error: &'a str,
    field: Option<&'a str>,
}

impl<'a> ErrorView<'a> {
    fn from_data(data: &'a DataMap) -> Self {
        let code = match data.get("code") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        Self {
            code,
            error: data.get("error").and_then(Value::as_str).unwrap_or(""),
            field: data.get("field").and_then(Value::as_str),
        }
    }
}

/// Views loaded from `*.html` files under a base directory.
///
/// Without a directory only the built-in error view is available.
#[derive(Debug, Clone, Default)]
pub struct TemplateViews {
    base_dir: Option<PathBuf>,
}

impl TemplateViews {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: Some(base.into()),
        }
    }

    /// Only the built-in error view.
    #[must_use]
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Map a view name to its file, rejecting anything but plain segments.
    fn map_path(&self, name: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone()?;
        let mut pushed = false;
        for comp in Path::new(name).components() {
            match comp {
                Component::Normal(s) => {
                    pb.push(s);
                    pushed = true;
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        if !pushed {
            return None;
        }
        pb.set_extension("html");
        Some(pb)
    }

    fn file_for(&self, name: &str) -> Option<PathBuf> {
        self.map_path(name).filter(|p| p.is_file())
    }
}

impl ViewEngine for TemplateViews {
    fn exists(&self, name: &str) -> bool {
        name == ERROR_VIEW || self.file_for(name).is_some()
    }

    fn render(&self, name: &str, data: &DataMap) -> Result<String, ViewError> {
        let Some(path) = self.file_for(name) else {
            if name == ERROR_VIEW {
                debug!("Rendering built-in error view");
                return Ok(ErrorView::from_data(data).render()?);
            }
            if self.base_dir.is_some() && self.map_path(name).is_none() {
                return Err(ViewError::InvalidName(name.to_string()));
            }
            return Err(ViewError::NotFound(name.to_string()));
        };

        let source = fs::read_to_string(&path)?;
        let template_name = format!("{name}.html");
        let mut env = Environment::new();
        env.add_template(&template_name, &source)?;
        let tmpl = env.get_template(&template_name)?;
        let rendered = tmpl.render(json!({ "data": data }))?;
        debug!(view = %name, path = %path.display(), "View rendered");
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn data(value: Value) -> DataMap {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_map_path_prevents_traversal() {
        let views = TemplateViews::new("views");
        assert!(views.map_path("../Cargo").is_none());
        assert!(views.map_path("/etc/passwd").is_none());
        assert!(views.map_path("").is_none());
        assert_eq!(
            views.map_path("admin/users"),
            Some(PathBuf::from("views/admin/users.html"))
        );
    }

    #[test]
    fn test_render_file_view() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pets")).unwrap();
        fs::write(
            dir.path().join("pets/index.html"),
            "<p>{{ data.name }}</p>",
        )
        .unwrap();
        let views = TemplateViews::new(dir.path());
        assert!(views.exists("pets/index"));
        assert!(!views.exists("pets"));
        let out = views.render("pets/index", &data(json!({"name": "rex"}))).unwrap();
        assert_eq!(out, "<p>rex</p>");
    }

    #[test]
    fn test_html_views_escape_values() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("pets.html"), "{{ data.name }}").unwrap();
        let views = TemplateViews::new(dir.path());
        let out = views.render("pets", &data(json!({"name": "<b>"}))).unwrap();
        assert_eq!(out, "&lt;b&gt;");
    }

    #[test]
    fn test_missing_view() {
        let dir = tempdir().unwrap();
        let views = TemplateViews::new(dir.path());
        let err = views.render("nope", &DataMap::new()).unwrap_err();
        assert!(matches!(err, ViewError::NotFound(_)));
        let err = views.render("../nope", &DataMap::new()).unwrap_err();
        assert!(matches!(err, ViewError::InvalidName(_)));
    }

    #[test]
    fn test_builtin_error_view() {
        let views = TemplateViews::builtin();
        assert!(views.exists(ERROR_VIEW));
        let out = views
            .render(
                ERROR_VIEW,
                &data(json!({"code": 400, "error": "Invalid name", "field": "name"})),
            )
            .unwrap();
        assert!(out.contains("(400) Invalid name"));
        assert!(out.contains(r#"<span class="field">name</span>"#));
    }

    #[test]
    fn test_error_file_overrides_builtin() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("error.html"), "oops {{ data.responseCode }}").unwrap();
        let views = TemplateViews::new(dir.path());
        let out = views
            .render(ERROR_VIEW, &data(json!({"error": "x", "responseCode": 404})))
            .unwrap();
        assert_eq!(out, "oops 404");
    }
}
