//! Junk command - delete named scraps
//!
//! Best effort: failures are logged and the command still succeeds.

use crate::cli::args::JunkArgs;
use crate::cli::commands::{templates, Context};
use crate::error::ScrapyardResult;
use std::process::ExitCode;
use tracing::{info, warn};

/// Execute the junk command
pub async fn execute(args: JunkArgs, ctx: &Context) -> ScrapyardResult<ExitCode> {
    let keys = templates(&args.keys.keys);

    let result: ScrapyardResult<usize> = async { ctx.open().await?.junk(&keys).await }.await;
    match result {
        Ok(removed) => info!("Junked {} scrap(s)", removed),
        Err(e) => warn!("Junk incomplete: {}", e),
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::KeyArgs;
    use crate::config::Config;
    use tempfile::TempDir;

    #[tokio::test]
    async fn junk_succeeds_on_unusable_yard() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "").unwrap();
        let ctx = Context::new(Some(file.display().to_string()), Config::default());
        let args = JunkArgs {
            keys: KeyArgs {
                keys: vec!["gems".to_string()],
            },
        };

        assert!(execute(args, &ctx).await.is_ok());
    }

    #[tokio::test]
    async fn junk_succeeds_on_invalid_yard_location() {
        let ctx = Context::new(Some(String::new()), Config::default());
        let args = JunkArgs {
            keys: KeyArgs {
                keys: vec!["gems".to_string()],
            },
        };

        assert!(execute(args, &ctx).await.is_ok());
    }
}
