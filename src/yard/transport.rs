//! S3 transport
//!
//! The S3 yard never talks to the network itself; it goes through an
//! [`S3Transport`]. The production transport shells out to the AWS CLI.

use crate::error::{ScrapyardError, ScrapyardResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Object-store primitives used by the S3 yard
#[async_trait]
pub trait S3Transport: Send + Sync {
    /// Raw `ls` listing of a bucket prefix
    async fn list(&self, uri: &str) -> ScrapyardResult<String>;

    /// Copy between a local path and an `s3://` URI, in either direction
    async fn copy(&self, from: &str, to: &str) -> ScrapyardResult<()>;

    /// Delete one object
    async fn remove(&self, uri: &str) -> ScrapyardResult<()>;
}

/// Transport running `aws s3 ...` subprocesses
pub struct AwsCli {
    program: String,
}

impl AwsCli {
    /// Create a transport invoking `program` (normally `aws`)
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Execute an `s3` subcommand and return the output
    async fn exec(&self, args: &[&str]) -> ScrapyardResult<std::process::Output> {
        debug!("Executing: {} s3 {:?}", self.program, args);

        Command::new(&self.program)
            .arg("s3")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ScrapyardError::command_failed(format!("{} s3 {:?}", self.program, args), e))
    }

    fn check(uri: &str, output: &std::process::Output) -> ScrapyardResult<()> {
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = match stderr.trim() {
            "" => output.status.to_string(),
            s => s.to_string(),
        };
        Err(ScrapyardError::backend(uri, reason))
    }
}

impl Default for AwsCli {
    fn default() -> Self {
        Self::new("aws")
    }
}

#[async_trait]
impl S3Transport for AwsCli {
    async fn list(&self, uri: &str) -> ScrapyardResult<String> {
        let output = self.exec(&["ls", uri]).await?;

        // `aws s3 ls` exits 1 without a message when the prefix is empty
        if output.status.code() == Some(1) && output.stderr.is_empty() {
            return Ok(String::new());
        }

        Self::check(uri, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn copy(&self, from: &str, to: &str) -> ScrapyardResult<()> {
        let output = self.exec(&["cp", "--only-show-errors", from, to]).await?;
        let remote = if from.starts_with("s3://") { from } else { to };
        Self::check(remote, &output)
    }

    async fn remove(&self, uri: &str) -> ScrapyardResult<()> {
        let output = self.exec(&["rm", "--only-show-errors", uri]).await?;
        Self::check(uri, &output)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_command_failure() {
        let transport = AwsCli::new("scrapyard-test-no-such-binary");
        let err = transport.list("s3://bucket/").await.unwrap_err();
        assert!(matches!(err, ScrapyardError::CommandFailed { .. }));
        assert!(err.hint().is_some());
    }

    #[test]
    fn default_program_is_aws() {
        assert_eq!(AwsCli::default().program, "aws");
    }
}
