use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, RequestBuilder,
    header::{ACCEPT, AUTHORIZATION},
};

use crate::config::AdapterProperties;
use crate::domain::ticket::ChangeRequestDraft;
use crate::error::{AppError, AppResult};
use crate::services::{RawResponse, TicketingConnector};

/// Table API client bound to one instance and one table.
pub struct ServiceNowConnector {
    http: Client,
    endpoint: String,
    auth_header: String,
}

impl ServiceNowConnector {
    pub fn new(properties: &AdapterProperties) -> Self {
        Self {
            http: Client::new(),
            endpoint: Self::table_endpoint(&properties.url, &properties.table),
            auth_header: Self::auth_header(&properties.auth.username, &properties.auth.password),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn auth_header(username: &str, password: &str) -> String {
        let credentials = format!("{username}:{password}");
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn table_endpoint(base_url: &str, table: &str) -> String {
        format!("{}/api/now/table/{table}", base_url.trim_end_matches('/'))
    }

    async fn send(&self, method: &str, request: RequestBuilder) -> AppResult<RawResponse> {
        tracing::debug!(method, endpoint = %self.endpoint, "calling ServiceNow");

        let response = request
            .header(AUTHORIZATION, &self.auth_header)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::Transport(format!("failed to call ServiceNow: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Transport(format!(
                "ServiceNow responded with {status}: {body}"
            )));
        }

        let body = response.text().await.map_err(|err| {
            AppError::Transport(format!("failed to read ServiceNow response: {err}"))
        })?;

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl TicketingConnector for ServiceNowConnector {
    async fn get_record(&self) -> AppResult<RawResponse> {
        self.send("GET", self.http.get(&self.endpoint)).await
    }

    async fn post_record(&self, draft: &ChangeRequestDraft) -> AppResult<RawResponse> {
        self.send("POST", self.http.post(&self.endpoint).json(draft)).await
    }
}
