use serde::{Deserialize, Serialize};

/// Structured connection parameters addressing the backend.
///
/// Field names stay camelCase on the wire so pasted config objects and the
/// persisted override round-trip unchanged:
/// `{ "projectId": "demo-1", "apiKey": "...", ... }`
///
/// A Configuration is replaced wholesale, never mutated in place; any
/// replacement triggers a full connection rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// The unique project identifier. Must be non-empty before the
    /// configuration is usable.
    #[serde(default)]
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// Any further parameters a pasted config carries; kept verbatim so a
    /// save/load round-trip loses nothing.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Config {
    /// A minimal configuration carrying only a project identifier.
    pub fn for_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: None,
            auth_domain: None,
            app_id: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Whether this configuration is complete enough to open a connection.
    pub fn is_usable(&self) -> bool {
        !self.project_id.is_empty()
    }
}
