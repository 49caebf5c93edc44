use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{
    ADAPTER_ID_VAR, AppConfig, PASSWORD_VAR, StoredConfig, TABLE_VAR, URL_VAR, USERNAME_VAR,
    config_file_path,
};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the effective configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring the ServiceNow adapter.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Leave the password empty and export {PASSWORD_VAR} to keep it out of the file.");
    println!();

    apply_prompt(
        "ServiceNow instance URL (e.g., https://dev12345.service-now.com)",
        &mut cfg.instance_url,
        false,
    )?;
    apply_prompt("ServiceNow username", &mut cfg.username, false)?;
    apply_prompt("ServiceNow password", &mut cfg.password, true)?;
    apply_prompt("Table name (e.g., change_request)", &mut cfg.table, false)?;
    apply_prompt("Adapter id", &mut cfg.adapter_id, false)?;

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = AppConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!(
        "Environment overrides: {URL_VAR}, {USERNAME_VAR}, {PASSWORD_VAR}, {TABLE_VAR}, {ADAPTER_ID_VAR}"
    );
    println!("Instance URL: {}", display_value(&cfg.instance_url));
    println!("Username: {}", display_value(&cfg.username));
    println!("Password: {}", mask_secret(&cfg.password));
    println!("Table: {}", display_value(&cfg.table));
    println!("Adapter id: {}", cfg.adapter_id);

    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    match prompt(field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn prompt(field: &str, current: Option<&str>, secret: bool) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match (current, secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(PromptAction::parse(&input))
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(secret) if secret.chars().count() > 6 => {
            let chars: Vec<char> = secret.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(secret) if !secret.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[derive(Debug, PartialEq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

impl PromptAction {
    fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            PromptAction::Keep
        } else if trimmed == "-" {
            PromptAction::Clear
        } else {
            PromptAction::Set(trimmed.to_string())
        }
    }
}
