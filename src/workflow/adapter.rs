use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, watch};

use crate::config::AdapterProperties;
use crate::domain::status::{AdapterStatus, StatusEvent};
use crate::domain::ticket::{ChangeRecord, ChangeRequestDraft, parse_change_ticket};
use crate::error::AppResult;
use crate::infra::servicenow::ServiceNowConnector;
use crate::services::{RawResponse, TicketingConnector};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Change-request adapter exposed to the orchestration platform.
///
/// Every call returns `AppResult<Option<T>>`:
/// - `Ok(Some(data))` when the instance answered with the expected shape,
/// - `Err(error)` when the request itself failed,
/// - `Ok(None)` when a body arrived but could not be interpreted. That case is
///   logged and carries no error; callers must treat it as an unspecified
///   failure.
pub struct Adapter {
    id: String,
    connector: Arc<dyn TicketingConnector>,
    events: broadcast::Sender<StatusEvent>,
    state: watch::Sender<Option<AdapterStatus>>,
}

impl Adapter {
    pub fn new(id: impl Into<String>, connector: Arc<dyn TicketingConnector>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (state, _) = watch::channel(None);
        Self {
            id: id.into(),
            connector,
            events,
            state,
        }
    }

    pub fn from_properties(properties: &AdapterProperties) -> Self {
        Self::new(
            properties.id.clone(),
            Arc::new(ServiceNowConnector::new(properties)),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last status observed by a healthcheck, `None` before the first one.
    pub fn status(&self) -> Option<AdapterStatus> {
        *self.state.borrow()
    }

    /// Register a listener for `ONLINE`/`OFFLINE` events.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.events.subscribe()
    }

    pub async fn connect(&self) -> AdapterStatus {
        match self.healthcheck().await {
            Ok(_) => AdapterStatus::Online,
            Err(_) => AdapterStatus::Offline,
        }
    }

    /// Probe the instance with a read and publish the outcome.
    ///
    /// The read's result is handed back unchanged so callers can reuse it.
    pub async fn healthcheck(&self) -> AppResult<Option<Vec<ChangeRecord>>> {
        let result = self.get_record().await;
        match &result {
            Ok(_) => self.emit_online(),
            Err(err) => {
                tracing::warn!(adapter = %self.id, error = %err, "healthcheck failed");
                self.emit_offline();
            }
        }
        result
    }

    pub async fn get_record(&self) -> AppResult<Option<Vec<ChangeRecord>>> {
        let response = self.connector.get_record().await?;

        let records = match result_field(&response, "get_record") {
            Some(Value::Array(tickets)) => Some(tickets.iter().map(parse_change_ticket).collect()),
            Some(other) => {
                tracing::error!(
                    operation = "get_record",
                    status = response.status,
                    kind = json_kind(&other),
                    "expected `result` to be an array"
                );
                None
            }
            None => None,
        };
        Ok(records)
    }

    pub async fn post_record(&self, draft: &ChangeRequestDraft) -> AppResult<Option<ChangeRecord>> {
        let response = self.connector.post_record(draft).await?;
        Ok(result_field(&response, "post_record").map(|ticket| parse_change_ticket(&ticket)))
    }

    fn emit_online(&self) {
        self.emit_status(AdapterStatus::Online);
    }

    fn emit_offline(&self) {
        self.emit_status(AdapterStatus::Offline);
    }

    fn emit_status(&self, status: AdapterStatus) {
        let previous = self.state.send_replace(Some(status));
        if previous != Some(status) {
            tracing::info!(adapter = %self.id, status = status.as_str(), "adapter status changed");
        }

        let event = StatusEvent {
            status,
            id: self.id.clone(),
        };
        match self.events.send(event) {
            Ok(listeners) => tracing::debug!(event = status.as_str(), listeners, "status emitted"),
            Err(_) => tracing::debug!(event = status.as_str(), "status emitted with no listeners"),
        }
    }
}

/// Pull `result` out of a table API body, logging anything unusable.
fn result_field(response: &RawResponse, operation: &'static str) -> Option<Value> {
    let status = response.status;
    let parsed: Value = match serde_json::from_str(&response.body) {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(operation, status, error = %err, "ServiceNow returned malformed JSON");
            return None;
        }
    };

    match parsed {
        Value::Object(mut fields) => {
            let result = fields.remove("result");
            if result.is_none() {
                tracing::error!(operation, status, "ServiceNow response has no `result` field");
            }
            result
        }
        other => {
            tracing::error!(
                operation,
                status,
                kind = json_kind(&other),
                "ServiceNow response is not an object"
            );
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::AppError;

    use super::*;

    enum Reply {
        Body(u16, String),
        Fail(&'static str),
    }

    struct ScriptedConnector {
        reply: Reply,
        posted: Mutex<Vec<ChangeRequestDraft>>,
    }

    impl ScriptedConnector {
        fn body(body: impl Into<String>) -> Arc<Self> {
            Self::with_status(200, body)
        }

        fn with_status(status: u16, body: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                reply: Reply::Body(status, body.into()),
                posted: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Reply::Fail(message),
                posted: Mutex::new(Vec::new()),
            })
        }

        fn respond(&self) -> AppResult<RawResponse> {
            match &self.reply {
                Reply::Body(status, body) => Ok(RawResponse {
                    status: *status,
                    body: body.clone(),
                }),
                Reply::Fail(message) => Err(AppError::Transport(message.to_string())),
            }
        }
    }

    #[async_trait]
    impl TicketingConnector for ScriptedConnector {
        async fn get_record(&self) -> AppResult<RawResponse> {
            self.respond()
        }

        async fn post_record(&self, draft: &ChangeRequestDraft) -> AppResult<RawResponse> {
            self.posted.lock().unwrap().push(draft.clone());
            self.respond()
        }
    }

    fn ticket(number: &str, sys_id: &str) -> Value {
        json!({
            "number": number,
            "sys_id": sys_id,
            "active": "true",
            "priority": "3",
            "description": format!("work for {number}"),
            "work_start": "2024-05-01 09:00:00",
            "work_end": "2024-05-01 11:00:00",
            "state": "-4",
            "short_description": "ignored"
        })
    }

    #[tokio::test]
    async fn get_record_maps_every_ticket() {
        let (t1, t2) = (ticket("CHG001", "a1"), ticket("CHG002", "b2"));
        let body = json!({ "result": [t1.clone(), t2.clone()] }).to_string();
        let adapter = Adapter::new("snow", ScriptedConnector::body(body));

        let records = adapter.get_record().await.unwrap().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], parse_change_ticket(&t1));
        assert_eq!(records[1], parse_change_ticket(&t2));
        assert_eq!(records[1].change_ticket_key, Some(json!("b2")));
    }

    #[tokio::test]
    async fn get_record_passes_transport_error_through() {
        let adapter = Adapter::new("snow", ScriptedConnector::failing("connection reset"));

        let err = adapter.get_record().await.unwrap_err();

        assert!(matches!(err, AppError::Transport(msg) if msg == "connection reset"));
    }

    #[tokio::test]
    async fn post_record_maps_the_created_ticket() {
        let t1 = ticket("CHG003", "c3");
        let connector = ScriptedConnector::body(json!({ "result": t1.clone() }).to_string());
        let adapter = Adapter::new("snow", connector.clone());
        let draft = ChangeRequestDraft {
            short_description: Some("Patch database".to_string()),
            ..ChangeRequestDraft::default()
        };

        let record = adapter.post_record(&draft).await.unwrap().unwrap();

        assert_eq!(record, parse_change_ticket(&t1));
        assert_eq!(connector.posted.lock().unwrap().as_slice(), &[draft]);
    }

    #[tokio::test]
    async fn malformed_json_yields_nothing_without_error() {
        let adapter = Adapter::new("snow", ScriptedConnector::body("<html>maintenance</html>"));

        assert!(adapter.get_record().await.unwrap().is_none());
        assert!(
            adapter
                .post_record(&ChangeRequestDraft::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn unexpected_shape_yields_nothing() {
        let missing = Adapter::new("snow", ScriptedConnector::body(r#"{"error":{"message":"x"}}"#));
        assert!(missing.get_record().await.unwrap().is_none());

        let not_a_list = Adapter::new("snow", ScriptedConnector::body(r#"{"result":{"number":"1"}}"#));
        assert!(not_a_list.get_record().await.unwrap().is_none());

        let bare_array = Adapter::new("snow", ScriptedConnector::body("[]"));
        assert!(bare_array.get_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn post_record_passes_transport_error_through() {
        let connector = ScriptedConnector::failing("tls handshake failed");
        let adapter = Adapter::new("snow", connector.clone());

        let err = adapter
            .post_record(&ChangeRequestDraft::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Transport(msg) if msg == "tls handshake failed"));
        assert_eq!(connector.posted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn post_record_without_result_yields_nothing() {
        let body = r#"{"error":{"message":"Invalid table","detail":null},"status":"failure"}"#;
        let adapter = Adapter::new("snow", ScriptedConnector::with_status(201, body));

        let record = adapter
            .post_record(&ChangeRequestDraft::default())
            .await
            .unwrap();

        assert!(record.is_none());
    }

    #[tokio::test]
    async fn empty_body_with_success_status_yields_nothing() {
        let adapter = Adapter::new("snow", ScriptedConnector::with_status(204, ""));

        assert!(adapter.get_record().await.unwrap().is_none());
        assert!(
            adapter
                .post_record(&ChangeRequestDraft::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn empty_result_is_an_empty_list() {
        let adapter = Adapter::new("snow", ScriptedConnector::body(r#"{"result":[]}"#));
        assert_eq!(adapter.get_record().await.unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn healthcheck_emits_offline_and_returns_the_error() {
        let adapter = Adapter::new("snow-7", ScriptedConnector::failing("dns failure"));
        let mut events = adapter.subscribe();

        let result = adapter.healthcheck().await;

        assert!(matches!(result, Err(AppError::Transport(msg)) if msg == "dns failure"));
        let event = events.try_recv().unwrap();
        assert_eq!(event.name(), "OFFLINE");
        assert_eq!(event.id, "snow-7");
        assert_eq!(adapter.status(), Some(AdapterStatus::Offline));
    }

    #[tokio::test]
    async fn healthcheck_emits_online_and_returns_the_records() {
        let body = json!({ "result": [ticket("CHG004", "d4")] }).to_string();
        let adapter = Adapter::new("snow-7", ScriptedConnector::body(body));
        let mut events = adapter.subscribe();

        let records = adapter.healthcheck().await.unwrap().unwrap();

        assert_eq!(records.len(), 1);
        let event = events.try_recv().unwrap();
        assert_eq!(event.name(), "ONLINE");
        assert_eq!(
            serde_json::to_value(event.payload()).unwrap(),
            json!({ "id": "snow-7" })
        );
        assert_eq!(adapter.status(), Some(AdapterStatus::Online));
    }

    #[tokio::test]
    async fn unreadable_body_still_counts_as_online() {
        let adapter = Adapter::new("snow", ScriptedConnector::body("not json"));
        let mut events = adapter.subscribe();

        assert!(adapter.healthcheck().await.unwrap().is_none());
        assert_eq!(events.try_recv().unwrap().status, AdapterStatus::Online);
    }

    #[tokio::test]
    async fn status_is_unknown_until_connect() {
        let adapter = Adapter::new("snow", ScriptedConnector::failing("refused"));
        assert_eq!(adapter.status(), None);

        assert_eq!(adapter.connect().await, AdapterStatus::Offline);
        assert_eq!(adapter.status(), Some(AdapterStatus::Offline));
    }

    #[tokio::test]
    async fn every_healthcheck_emits_an_event() {
        let adapter = Adapter::new("snow", ScriptedConnector::body(r#"{"result":[]}"#));
        let mut events = adapter.subscribe();

        adapter.connect().await;
        adapter.connect().await;

        assert_eq!(events.try_recv().unwrap().status, AdapterStatus::Online);
        assert_eq!(events.try_recv().unwrap().status, AdapterStatus::Online);
        assert!(events.try_recv().is_err());
    }
}
