//! Store command - pack paths under the first key

use crate::archive::format_bytes;
use crate::cli::args::StoreArgs;
use crate::cli::commands::{templates, Context};
use crate::error::{ScrapyardError, ScrapyardResult};
use std::process::ExitCode;
use tracing::debug;

/// Execute the store command
pub async fn execute(args: StoreArgs, ctx: &Context) -> ScrapyardResult<ExitCode> {
    let keys = templates(&args.keys.keys);
    let paths = args.paths.all();
    if paths.is_empty() {
        return Err(ScrapyardError::User(
            "store requires paths (use -p PATH or -- PATH...)".to_string(),
        ));
    }

    let scrapyard = ctx.open().await?;
    let entry = scrapyard.store(&keys, &paths).await?;
    debug!("Stored {} ({})", entry.locator, format_bytes(entry.size));

    Ok(ExitCode::SUCCESS)
}
