use async_trait::async_trait;

use crate::domain::ticket::ChangeRequestDraft;
use crate::error::AppResult;

/// Status line and body of a successful table API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Raw access to one ticketing table.
///
/// Implementations return the body untouched; interpreting it is the
/// adapter's job. Any non-success status must come back as an error.
#[async_trait]
pub trait TicketingConnector: Send + Sync {
    async fn get_record(&self) -> AppResult<RawResponse>;
    async fn post_record(&self, draft: &ChangeRequestDraft) -> AppResult<RawResponse>;
}
