use crate::context::AppContext;
use crate::domain::status::AdapterStatus;
use crate::error::{AppError, AppResult};

/// Connect once and print every status event the adapter emitted.
pub async fn run(ctx: &AppContext) -> AppResult<()> {
    let mut events = ctx.adapter.subscribe();
    let status = ctx.adapter.connect().await;

    while let Ok(event) = events.try_recv() {
        println!("{} {}", event.name(), serde_json::to_string(&event.payload())?);
    }

    let summary = format!(
        "adapter {} (table {}) is {}",
        ctx.config.adapter_id,
        ctx.config.table.as_deref().unwrap_or("<not set>"),
        status.as_str()
    );
    match status {
        AdapterStatus::Online => {
            println!("{summary}");
            Ok(())
        }
        AdapterStatus::Offline => Err(AppError::Transport(summary)),
    }
}
