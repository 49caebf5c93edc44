use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Internal shape of a change-request ticket.
///
/// Values are kept as raw JSON so whatever the instance returns (strings,
/// booleans, display-value objects) survives unchanged. A field the ticket
/// did not carry stays `None` and is left out when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_ticket_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_ticket_key: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_start: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_end: Option<Value>,
}

/// Body sent when creating a change request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRequestDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_end: Option<String>,
}

impl Default for ChangeRequestDraft {
    fn default() -> Self {
        Self {
            short_description: Some("Change request opened by snow-adapter".to_string()),
            description: Some("Placeholder change request; update before approval.".to_string()),
            priority: Some("4".to_string()),
            work_start: None,
            work_end: None,
        }
    }
}

/// Maps a ticket as returned by the table API onto a [`ChangeRecord`].
///
/// No validation: unknown fields are dropped, missing ones stay `None`, and a
/// value that is not a JSON object yields an empty record.
pub fn parse_change_ticket(ticket: &Value) -> ChangeRecord {
    let field = |name: &str| ticket.get(name).cloned();

    ChangeRecord {
        change_ticket_number: field("number"),
        change_ticket_key: field("sys_id"),
        active: field("active"),
        priority: field("priority"),
        description: field("description"),
        work_start: field("work_start"),
        work_end: field("work_end"),
    }
}
