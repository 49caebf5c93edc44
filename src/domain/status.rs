use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterStatus {
    Online,
    Offline,
}

impl AdapterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterStatus::Online => "ONLINE",
            AdapterStatus::Offline => "OFFLINE",
        }
    }
}

/// Notification published on every healthcheck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub status: AdapterStatus,
    pub id: String,
}

/// Body delivered to listeners alongside the event name.
#[derive(Debug, Serialize)]
pub struct StatusPayload<'a> {
    pub id: &'a str,
}

impl StatusEvent {
    pub fn name(&self) -> &'static str {
        self.status.as_str()
    }

    pub fn payload(&self) -> StatusPayload<'_> {
        StatusPayload { id: &self.id }
    }
}
