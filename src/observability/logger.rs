//! Markdown journal of invocation sessions.

use crate::error::BridgeError;
use crate::pipeline::{InvocationObserver, InvocationOutcome};
use crate::signature::Signature;
use crate::types::NativeValue;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Journal of command invocations.
///
/// This log creates markdown-formatted files tracking sessions, the
/// arguments each command was invoked with, what came back and what failed.
/// Attach it to a bridge with
/// [`BridgeBuilder::observer`](crate::BridgeBuilder::observer) to record every
/// invocation.
#[derive(Debug)]
pub struct InvocationLog {
    log_file: PathBuf,
    log_level: String,
}

impl InvocationLog {
    /// Initialize the journal.
    ///
    /// # Arguments
    /// * `log_file` - Path to log file. If None, creates a timestamped file in temp directory.
    /// * `log_level` - Logging level (defaults to "INFO"). At "DEBUG" foreign
    ///   stack traces are written too.
    pub fn new(log_file: Option<&Path>, log_level: Option<&str>) -> Result<Self> {
        let log_file = match log_file {
            Some(p) => p.to_path_buf(),
            None => {
                let dir = std::env::temp_dir().join("cmdbridge-logs");
                let filename = format!(
                    "invocations_{}_{}.md",
                    Utc::now().timestamp_millis(),
                    std::process::id()
                );
                dir.join(filename)
            }
        };

        let log_level = log_level.unwrap_or("INFO").to_uppercase();

        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let log = Self {
            log_file,
            log_level,
        };

        if !log.log_file.exists() {
            log.initialize_log_file()?;
        }

        Ok(log)
    }

    fn initialize_log_file(&self) -> Result<()> {
        let mut file = File::create(&self.log_file)
            .with_context(|| format!("Failed to create log file: {}", self.log_file.display()))?;

        let now: DateTime<Utc> = Utc::now();

        writeln!(file, "# Command Invocation Log\n")?;
        writeln!(file, "Log started: {}\n", now.to_rfc3339())?;
        writeln!(file, "---\n")?;

        Ok(())
    }

    fn append_to_log(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {}", self.log_file.display()))?;

        write!(file, "{}", content).with_context(|| "Failed to write to log file")?;

        Ok(())
    }

    fn is_debug(&self) -> bool {
        self.log_level == "DEBUG"
    }

    /// Log session start.
    ///
    /// # Arguments
    /// * `runtime` - Name of the foreign runtime serving the session.
    /// * `config` - Settings worth recording.
    pub fn log_session_start(
        &self,
        runtime: &str,
        config: &HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "## Session Started - {}\n\n**Runtime:** {}\n**Config:** {}\n\n",
            now.to_rfc3339(),
            runtime,
            serde_json::to_string_pretty(config).unwrap_or_default()
        );

        self.append_to_log(&content)?;
        tracing::info!(runtime, "invocation journal session started");
        Ok(())
    }

    /// Log the arguments an invocation was bound with.
    pub fn log_invocation(
        &self,
        signature: &Signature,
        arguments: &[(String, Option<NativeValue>)],
    ) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let mut content = format!(
            "### Invocation - {}\n\n**Command:** `{}`\n**Signature:** `{}{}`\n\n",
            now.to_rfc3339(),
            signature.name(),
            signature.name(),
            signature
        );

        if !arguments.is_empty() {
            content.push_str("**Arguments:**\n");
            for (name, value) in arguments {
                match value {
                    Some(value) => content.push_str(&format!("- {} = {}\n", name, value)),
                    None => content.push_str(&format!("- {} (unset)\n", name)),
                }
            }
            content.push('\n');
        }

        self.append_to_log(&content)
    }

    /// Log what an invocation produced.
    pub fn log_results(&self, outcome: &InvocationOutcome) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let mut content = format!(
            "### Results - {}\n\n**Command:** {}\n\n",
            now.to_rfc3339(),
            outcome.command_title
        );

        if outcome.is_empty() {
            content.push_str("No results.\n\n");
        }
        if !outcome.displayable.is_empty() {
            content.push_str("**Displayed:**\n");
            for result in &outcome.displayable {
                content.push_str(&format!("- {} ({})\n", result.name, result.kind.name()));
            }
            content.push('\n');
        }
        if !outcome.non_displayable.is_empty() {
            content.push_str("**Values:**\n");
            for value in &outcome.non_displayable {
                content.push_str(&format!("- {}\n", value));
            }
            content.push('\n');
        }
        if !outcome.refresh.is_empty() {
            let names: Vec<&str> = outcome.refresh.iter().map(|r| r.name()).collect();
            content.push_str(&format!("**Modified in place:** {}\n\n", names.join(", ")));
        }
        for failure in &outcome.stage_failures {
            content.push_str(&format!(
                "**Stage failed:** {}: {}\n\n",
                failure.stage, failure.message
            ));
            if self.is_debug() && !failure.trace.is_empty() {
                content.push_str(&format!("```\n{}\n```\n\n", failure.trace));
            }
        }

        self.append_to_log(&content)
    }

    /// Log a failed invocation.
    pub fn log_failure(&self, command: &str, error: &BridgeError) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let mut content = format!(
            "### Failure - {}\n\n**Command:** {}\n**Error:** {}\n\n",
            now.to_rfc3339(),
            command,
            error.to_string().lines().next().unwrap_or_default()
        );

        if let Some(trace) = error.trace() {
            if self.is_debug() {
                content.push_str(&format!("**Trace:**\n```\n{}\n```\n\n", trace));
            }
        }

        self.append_to_log(&content)
    }

    /// Log session completion.
    ///
    /// # Arguments
    /// * `reason` - Reason for completion.
    pub fn log_completion(&self, reason: &str) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "### Session Completed - {}\n\n**Reason:** {}\n\n---\n\n",
            now.to_rfc3339(),
            reason
        );

        self.append_to_log(&content)?;
        tracing::info!(reason, "invocation journal session completed");
        Ok(())
    }

    /// Get the log file path.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Get the log level.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

impl InvocationObserver for InvocationLog {
    fn invocation_started(
        &self,
        signature: &Signature,
        arguments: &[(String, Option<NativeValue>)],
    ) {
        if let Err(e) = self.log_invocation(signature, arguments) {
            tracing::warn!(error = %e, "failed to journal invocation");
        }
    }

    fn invocation_finished(&self, _signature: &Signature, outcome: &InvocationOutcome) {
        if let Err(e) = self.log_results(outcome) {
            tracing::warn!(error = %e, "failed to journal results");
        }
    }

    fn invocation_failed(&self, signature: &Signature, error: &BridgeError) {
        if let Err(e) = self.log_failure(signature.name(), error) {
            tracing::warn!(error = %e, "failed to journal failure");
        }
    }
}
