/// MIME type for a format identifier or file extension.
#[must_use]
pub fn mime_by_ext(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "json" => "application/json",
        "xml" => "text/xml",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        "css" => "text/css",
        "js" => "application/javascript",
        "csv" => "text/csv",
        "yaml" | "yml" => "application/yaml",
        _ => "application/octet-stream",
    }
}
