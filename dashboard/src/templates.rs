use std::collections::HashMap;
use std::path::Path;

use tera::{Tera, Value};

/// Overrides where the templates are read from
pub const TEMPLATES_DIR_ENV: &str = "DASHBOARD_TEMPLATES_DIR";

lazy_static::lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = match Tera::new(&template_glob()) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!("Template parsing error: {}", e);
                std::process::exit(1);
            }
        };
        tera.register_filter("script_json", script_json);
        tera
    };
}

/// Glob for the template files, relative to the working directory
///
/// Checks the workspace layout first, then the crate directory (where
/// `cargo test` runs).
fn template_glob() -> String {
    let dir = std::env::var(TEMPLATES_DIR_ENV).unwrap_or_else(|_| {
        ["dashboard/templates", "templates"]
            .into_iter()
            .find(|d| Path::new(d).is_dir())
            .unwrap_or("dashboard/templates")
            .to_string()
    });
    format!("{}/**/*.html", dir.trim_end_matches('/'))
}

/// Serialize a value as JSON that is safe to inline in a `<script>` element
fn script_json(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let json = serde_json::to_string(value).map_err(|e| tera::Error::msg(e.to_string()))?;
    Ok(Value::String(escape_script_json(&json)))
}

/// `<`, `>` and `&` only occur inside JSON strings, where `\uXXXX` is equivalent
fn escape_script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}
