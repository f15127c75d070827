//! CLI command implementations
//!
//! Each handler maps one [`crate::cli::Commands`] variant to a process exit
//! code.

pub mod crush;
pub mod junk;
pub mod search;
pub mod store;

pub use crush::execute as crush;
pub use junk::execute as junk;
pub use search::execute as search;
pub use store::execute as store;

use crate::config::Config;
use crate::controller::Scrapyard;
use crate::error::ScrapyardResult;
use crate::key::KeyTemplate;
use crate::yard::{create_yard, YardSpec};
use tracing::debug;

/// Everything a command needs besides its own arguments
#[derive(Debug, Clone)]
pub struct Context {
    yard: Option<String>,
    pub config: Config,
}

impl Context {
    /// Build the context; an explicit yard wins over the config's
    pub fn new(yard: Option<String>, config: Config) -> Self {
        Self { yard, config }
    }

    /// Parse the yard location this context points at
    pub fn yard_spec(&self) -> ScrapyardResult<YardSpec> {
        let location = self.yard.as_deref().unwrap_or(&self.config.yard.path);
        let spec = YardSpec::parse(location)?;
        debug!("Using {} yard {}", spec.kind.name(), spec.root);
        Ok(spec)
    }

    /// Create and initialize the yard backend
    pub async fn open(&self) -> ScrapyardResult<Scrapyard> {
        let backend = create_yard(&self.yard_spec()?, &self.config.s3)?;
        Scrapyard::open(backend, &self.config.yard.extension).await
    }
}

/// Key templates in the order given; empty keys are skipped
pub(crate) fn templates(keys: &[String]) -> Vec<KeyTemplate> {
    keys.iter()
        .filter(|k| !k.is_empty())
        .map(|k| KeyTemplate::from(k.as_str()))
        .collect()
}
