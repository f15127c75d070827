//! Crush command - evict scraps past the retention window
//!
//! Best effort: failures are logged and the command still succeeds.

use crate::cli::commands::Context;
use crate::error::ScrapyardResult;
use std::process::ExitCode;
use tracing::warn;

/// Execute the crush command
pub async fn execute(ctx: &Context) -> ScrapyardResult<ExitCode> {
    let result: ScrapyardResult<_> = async { ctx.open().await?.crush().await }.await;
    if let Err(e) = result {
        warn!("Crush incomplete: {}", e);
    }

    Ok(ExitCode::SUCCESS)
}
