//! `${name}` placeholder substitution.
//!
//! Only bare identifiers are substituted; nothing in a template is ever
//! evaluated.

use crate::NavError;
use log::debug;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").expect("valid placeholder pattern"));

/// Substitute every `${name}` in `template` with the matching parameter.
///
/// Parameters that the template does not mention are ignored.
pub fn interpolate_string<I, K, V>(template: &str, params: I) -> Result<String, NavError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    if template.contains('`') {
        return Err(NavError::Backtick);
    }
    let values: HashMap<String, String> = params
        .into_iter()
        .map(|(name, value)| (name.as_ref().to_string(), value.to_string()))
        .collect();

    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;
    for captures in PLACEHOLDER_RE.captures_iter(template) {
        let (Some(whole), Some(expr)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let name = expr.as_str().trim();
        if !is_identifier(name) {
            return Err(NavError::UnsupportedExpression(name.to_string()));
        }
        let value = values
            .get(name)
            .ok_or_else(|| NavError::UnknownVariable(name.to_string()))?;
        rendered.push_str(&template[last..whole.start()]);
        rendered.push_str(value);
        last = whole.end();
    }
    rendered.push_str(&template[last..]);
    debug!("interpolated template (template={template}, rendered={rendered})");
    Ok(rendered)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
