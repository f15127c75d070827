//! Scrapyard - content-addressed build artifact cache
//!
//! Packs build outputs into tarballs keyed by templates that may embed file
//! checksums, and stores them in a local directory or an S3 prefix.

pub mod archive;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod key;
pub mod yard;

pub use controller::{Scrapyard, SearchOutcome};
pub use error::{ScrapyardError, ScrapyardResult};
