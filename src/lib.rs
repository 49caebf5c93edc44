//! Adapter between an orchestration platform and the ServiceNow table API.
//!
//! [`workflow::Adapter`] is the entry point: it reads and creates
//! change-request records through a [`services::TicketingConnector`] and
//! publishes `ONLINE`/`OFFLINE` status events after each healthcheck.

pub mod cmd;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod services;
pub mod workflow;
