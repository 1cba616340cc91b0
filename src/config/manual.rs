use std::sync::OnceLock;

use regex::Regex;

use super::model::Config;
use crate::core::errors::ClientError;

static DECLARATION_PREFIX: OnceLock<Regex> = OnceLock::new();
static BARE_KEY: OnceLock<Regex> = OnceLock::new();

fn declaration_prefix() -> &'static Regex {
    DECLARATION_PREFIX
        .get_or_init(|| Regex::new(r"^(const|let|var|export)\s+\w+\s*=\s*").expect("valid regex"))
}

fn bare_key() -> &'static Regex {
    BARE_KEY.get_or_init(|| {
        Regex::new(r#"(\s*?\{\s*?|\s*?,\s*?)(['"])?([a-zA-Z0-9_]+)(['"])?\s*?:"#)
            .expect("valid regex")
    })
}

/// Converts loosely-formatted pasted configuration text into a validated
/// [`Config`].
///
/// Accepts the shape people actually paste: an object literal, possibly
/// wrapped in a declaration (`const cfg = { ... };`), with unquoted or
/// single-quoted keys. The bare-key rewrite is a regex over text, not a
/// parser; a string value containing `word:` right after a comma can get
/// mis-quoted. That fragility is a known property of the repair step and
/// is kept as-is.
///
/// Fails with [`ClientError::MalformedInput`]; the caller's state is
/// untouched on failure.
pub fn parse_manual_config(input: &str) -> Result<Config, ClientError> {
    let cleaned = declaration_prefix().replace(input.trim(), "");
    let cleaned = cleaned.trim_end_matches(|c: char| c == ';' || c.is_whitespace());

    let start = cleaned
        .find('{')
        .ok_or_else(|| ClientError::MalformedInput("Missing { } braces.".into()))?;
    let end = cleaned
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| ClientError::MalformedInput("Missing { } braces.".into()))?;
    let object = &cleaned[start..=end];

    let json_friendly = bare_key().replace_all(object, "${1}\"${3}\":");
    serde_json::from_str(&json_friendly).map_err(|e| ClientError::MalformedInput(e.to_string()))
}
