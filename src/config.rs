use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const APP_DIRECTORY: &str = "snow-adapter";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_ADAPTER_ID: &str = "servicenow";

pub const URL_VAR: &str = "SNOW_URL";
pub const USERNAME_VAR: &str = "SNOW_USERNAME";
pub const PASSWORD_VAR: &str = "SNOW_PASSWORD";
pub const TABLE_VAR: &str = "SNOW_TABLE";
pub const ADAPTER_ID_VAR: &str = "SNOW_ADAPTER_ID";

/// Effective settings after merging the stored file with the environment.
#[derive(Clone)]
pub struct AppConfig {
    pub instance_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub table: Option<String>,
    pub adapter_id: String,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Ok(Self::resolve(stored, |key| env::var(key).ok()))
    }

    /// Environment values win over stored ones; blank values count as unset.
    pub fn resolve(stored: StoredConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |var: &str, fallback: Option<String>| {
            non_blank(lookup(var)).or_else(|| non_blank(fallback))
        };

        Self {
            instance_url: pick(URL_VAR, stored.instance_url),
            username: pick(USERNAME_VAR, stored.username),
            password: pick(PASSWORD_VAR, stored.password),
            table: pick(TABLE_VAR, stored.table),
            adapter_id: pick(ADAPTER_ID_VAR, stored.adapter_id)
                .unwrap_or_else(|| DEFAULT_ADAPTER_ID.to_string()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Operator-managed file written by `snow config init`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    pub instance_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub table: Option<String>,
    pub adapter_id: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIRECTORY))
        .ok_or_else(|| {
            AppError::Configuration("unable to determine the user config directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Connection settings handed to an adapter at construction. Never mutated
/// afterwards.
#[derive(Debug, Clone)]
pub struct AdapterProperties {
    pub id: String,
    pub url: String,
    pub auth: Credentials,
    pub table: String,
}

impl AdapterProperties {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let required = |value: &Option<String>, var: &str, label: &str| {
            value.clone().ok_or_else(|| {
                AppError::Configuration(format!(
                    "{label} not configured (set {var} or run `snow config init`)"
                ))
            })
        };

        Ok(Self {
            id: config.adapter_id.clone(),
            url: required(&config.instance_url, URL_VAR, "ServiceNow URL")?,
            auth: Credentials {
                username: required(&config.username, USERNAME_VAR, "ServiceNow username")?,
                password: required(&config.password, PASSWORD_VAR, "ServiceNow password")?,
            },
            table: required(&config.table, TABLE_VAR, "ServiceNow table")?,
        })
    }
}
