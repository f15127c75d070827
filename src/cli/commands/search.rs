//! Search command - restore the best matching scrap

use crate::cli::args::SearchArgs;
use crate::cli::commands::{templates, Context};
use crate::controller::SearchOutcome;
use crate::error::{ScrapyardError, ScrapyardResult, EXIT_MISS};
use std::env;
use std::process::ExitCode;
use tracing::debug;

/// Execute the search command
///
/// Exits 1 when no key matches.
pub async fn execute(args: SearchArgs, ctx: &Context) -> ScrapyardResult<ExitCode> {
    let keys = templates(&args.keys.keys);
    let paths = args.paths.all();
    let cwd = env::current_dir().map_err(|e| ScrapyardError::io("getting current directory", e))?;

    let scrapyard = ctx.open().await?;
    match scrapyard.search(&keys, &paths, &cwd).await? {
        SearchOutcome::Hit(entry) => {
            debug!("Restored {} into {}", entry.locator, cwd.display());
            Ok(ExitCode::SUCCESS)
        }
        SearchOutcome::Miss => Ok(ExitCode::from(EXIT_MISS)),
    }
}
