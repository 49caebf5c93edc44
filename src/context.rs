use std::sync::Arc;

use crate::config::{AdapterProperties, AppConfig};
use crate::error::AppResult;
use crate::workflow::Adapter;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub adapter: Arc<Adapter>,
}

impl AppContext {
    pub fn new(config: AppConfig, adapter: Arc<Adapter>) -> Self {
        Self { config, adapter }
    }

    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let properties = AdapterProperties::from_config(&config)?;
        let adapter = Arc::new(Adapter::from_properties(&properties));
        Ok(Self::new(config, adapter))
    }
}
