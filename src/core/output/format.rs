//! Output formatters for different output modes.
//!
//! This module provides formatters for text, JSON, and NDJSON output modes,
//! each implementing the `OutputFormatter` trait for consistent behavior.

use super::events::{ItemStatus, ProgressEvent, SummaryInfo, SummaryResult};
use crate::git::StageMode;
use crate::models::OutputFormat;
use std::io::{self, Write};

/// Trait for formatting and writing output events.
pub trait OutputFormatter {
    /// Writes a progress event to the output.
    fn write_event(&mut self, event: &ProgressEvent) -> io::Result<()>;

    /// Writes a final summary.
    fn write_summary(&mut self, summary: &SummaryInfo) -> io::Result<()>;

    /// Flushes any buffered output.
    fn flush(&mut self) -> io::Result<()>;
}

/// Writer that formats output according to the specified format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    quiet: bool,
    events: Vec<ProgressEvent>,
}

impl<W: Write> OutputWriter<W> {
    /// Creates a new OutputWriter with the specified format.
    pub fn new(writer: W, format: OutputFormat, quiet: bool) -> Self {
        Self {
            writer,
            format,
            quiet,
            events: Vec::new(),
        }
    }

    /// Returns the output format.
    pub fn format(&self) -> &OutputFormat {
        &self.format
    }

    /// Returns whether quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        write!(self.writer, "{}", text)
    }

    fn writeln(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", text)
    }

    /// Formats a progress bar string.
    fn format_progress_bar(current: usize, total: usize, width: usize) -> String {
        if total == 0 {
            return format!("[{}]", " ".repeat(width));
        }

        let filled = (current * width) / total;
        let empty = width.saturating_sub(filled);

        format!("[{}{}]", "=".repeat(filled), " ".repeat(empty))
    }

    fn status_symbol(status: &ItemStatus) -> &'static str {
        match status {
            ItemStatus::Merged => "✓",
            ItemStatus::Conflict => "⚠",
            ItemStatus::Failed => "✗",
        }
    }

    /// Events still shown when quiet.
    fn is_problem(event: &ProgressEvent) -> bool {
        matches!(
            event,
            ProgressEvent::MergeConflict { .. }
                | ProgressEvent::MergeFailed { .. }
                | ProgressEvent::Error { .. }
        )
    }
}

impl<W: Write> OutputFormatter for OutputWriter<W> {
    fn write_event(&mut self, event: &ProgressEvent) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                if !self.quiet || Self::is_problem(event) {
                    self.write_text_event(event)?;
                }
            }
            OutputFormat::Json => {
                // Buffer events for final summary
                self.events.push(event.clone());
            }
            OutputFormat::Ndjson => {
                let json = serde_json::to_string(event).map_err(io::Error::other)?;
                self.writeln(&json)?;
            }
        }
        Ok(())
    }

    fn write_summary(&mut self, summary: &SummaryInfo) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                if self.quiet && summary.result == SummaryResult::Success {
                    return Ok(());
                }
                self.write_text_summary(summary)?;
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "summary": summary,
                    "events": self.events
                });
                let json = serde_json::to_string_pretty(&output).map_err(io::Error::other)?;
                self.writeln(&json)?;
            }
            OutputFormat::Ndjson => {
                let json = serde_json::to_string(summary).map_err(io::Error::other)?;
                self.writeln(&json)?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> OutputWriter<W> {
    /// Writes a text-formatted event.
    fn write_text_event(&mut self, event: &ProgressEvent) -> io::Result<()> {
        match event {
            ProgressEvent::WorkflowStart { repo_path, remote } => {
                self.writeln(&format!(
                    "Working in {} (remote: {})",
                    repo_path.display(),
                    remote
                ))?;
            }
            ProgressEvent::NothingToCommit => {
                self.writeln("○ Nothing to commit, working tree clean")?;
            }
            ProgressEvent::BranchCreated { branch } => {
                self.writeln(&format!("✓ Created branch {}", branch))?;
            }
            ProgressEvent::Pulled { remote, branch } => {
                self.writeln(&format!("✓ Pulled {}/{}", remote, branch))?;
            }
            ProgressEvent::Staged { mode } => {
                let what = match mode {
                    StageMode::All => "all changes",
                    StageMode::TrackedOnly => "tracked files",
                };
                self.writeln(&format!("✓ Staged {}", what))?;
            }
            ProgressEvent::Committed {
                message,
                commit_hash,
            } => {
                let hash = commit_hash
                    .as_deref()
                    .map(|h| format!(" [{}]", short_hash(h)))
                    .unwrap_or_default();
                self.writeln(&format!("✓ Committed{}: {}", hash, message))?;
            }
            ProgressEvent::PushRejected {
                remote,
                branch,
                output,
            } => {
                self.writeln(&format!("⚠ Push to {}/{} was rejected", remote, branch))?;
                for line in output.lines().filter(|l| !l.trim().is_empty()) {
                    self.writeln(&format!("   {}", line))?;
                }
            }
            ProgressEvent::RebaseStart { remote, branch } => {
                self.writeln(&format!("  Rebasing onto {}/{} and retrying", remote, branch))?;
            }
            ProgressEvent::Pushed {
                remote,
                branch,
                retry_used,
            } => {
                let retry = if *retry_used { " after rebase" } else { "" };
                self.writeln(&format!("✓ Pushed to {}/{}{}", remote, branch, retry))?;
            }
            ProgressEvent::MergeSweepStart {
                integration_branch,
                total,
            } => {
                self.writeln("")?;
                self.writeln(&format!(
                    "Merging {} branches into {}",
                    total, integration_branch
                ))?;
                self.writeln("")?;
            }
            ProgressEvent::MergeStart {
                branch,
                index,
                total,
            } => {
                let bar = Self::format_progress_bar(*index, *total, 20);
                self.write_text(&format!(
                    "\r{} [{}/{}] Merging {}...",
                    bar,
                    index + 1,
                    total,
                    branch
                ))?;
                self.writer.flush()?;
            }
            ProgressEvent::MergeSuccess { branch } => {
                self.writeln(&format!(" ✓ {} merged", branch))?;
            }
            ProgressEvent::MergeConflict { branch, aborted } => {
                self.writeln("")?;
                self.writeln(&format!(" ⚠ {} has conflicts, skipped", branch))?;
                if !aborted {
                    self.writeln("   merge --abort failed; the repository may still be mid-merge")?;
                }
            }
            ProgressEvent::MergeFailed { branch, error } => {
                self.writeln("")?;
                self.writeln(&format!(" ✗ {} failed: {}", branch, error.trim()))?;
            }
            ProgressEvent::Complete {
                merged,
                conflicts,
                failed,
            } => {
                self.writeln("")?;
                self.writeln(&format!(
                    "Complete: {} merged, {} conflicts, {} failed",
                    merged, conflicts, failed
                ))?;
            }
            ProgressEvent::RepoInitialized { path } => {
                self.writeln(&format!("✓ Initialized repository in {}", path.display()))?;
            }
            ProgressEvent::RepoCreated { name, url } => {
                let url = url
                    .as_deref()
                    .map(|u| format!(" ({})", u))
                    .unwrap_or_default();
                self.writeln(&format!("✓ Created repository {}{}", name, url))?;
            }
            ProgressEvent::RepoDeleted { name } => {
                self.writeln(&format!("✓ Deleted repository {}", name))?;
            }
            ProgressEvent::RepoListed { name, private } => {
                let visibility = if *private { " (private)" } else { "" };
                self.writeln(&format!("  • {}{}", name, visibility))?;
            }
            ProgressEvent::Error { message, code } => {
                let code_str = code
                    .as_ref()
                    .map(|c| format!(" [{}]", c))
                    .unwrap_or_default();
                self.writeln(&format!("Error{}: {}", code_str, message))?;
            }
        }
        Ok(())
    }

    fn write_text_summary(&mut self, summary: &SummaryInfo) -> io::Result<()> {
        // Single-step commands print one line, sweeps get the banner.
        if summary.counts.is_none() {
            if let Some(message) = &summary.message {
                let symbol = match summary.result {
                    SummaryResult::Success => "✓",
                    SummaryResult::NothingToDo => "○",
                    SummaryResult::PartialSuccess => "⚠",
                    SummaryResult::Failed => "✗",
                };
                self.writeln(&format!("{} {}", symbol, message))?;
            }
            return Ok(());
        }

        let result_line = match summary.result {
            SummaryResult::Success => "SUCCESS",
            SummaryResult::NothingToDo => "NOTHING TO DO",
            SummaryResult::PartialSuccess => "PARTIAL SUCCESS",
            SummaryResult::Failed => "FAILED",
        };
        self.writeln("")?;
        self.writeln("═══════════════════════════════════════════════════════════")?;
        self.writeln(&format!("                      {}", result_line))?;
        self.writeln("═══════════════════════════════════════════════════════════")?;
        self.writeln("")?;
        if let Some(branch) = &summary.integration_branch {
            self.writeln(&format!("Integration Branch: {}", branch))?;
            self.writeln("")?;
        }
        if let Some(counts) = &summary.counts {
            self.writeln("Results:")?;
            self.writeln(&format!("  ✓ Merged:     {}", counts.merged))?;
            self.writeln(&format!("  ⚠ Conflicts:  {}", counts.conflicts))?;
            self.writeln(&format!("  ✗ Failed:     {}", counts.failed))?;
            self.writeln("  ─────────────────")?;
            self.writeln(&format!("    Total:      {}", counts.total))?;
            self.writeln("")?;
        }
        if let Some(items) = &summary.items {
            let problems: Vec<_> = items
                .iter()
                .filter(|item| item.status != ItemStatus::Merged)
                .collect();
            if !problems.is_empty() {
                self.writeln("Needs attention:")?;
                for item in problems {
                    self.writeln(&format!(
                        "  {} {} [{}]",
                        Self::status_symbol(&item.status),
                        truncate_string(&item.branch, 50),
                        item.status
                    ))?;
                }
                self.writeln("")?;
            }
        }
        if let Some(message) = &summary.message {
            self.writeln(message)?;
        }
        Ok(())
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}

/// Truncates a string to a maximum length, adding ellipsis if needed.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
