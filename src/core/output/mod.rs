//! Output system for gitnoob commands.
//!
//! This module provides structured progress events and formatters for the
//! text, JSON and NDJSON output modes.

mod events;
mod format;

pub use events::{
    ItemStatus, ProgressEvent, SummaryCounts, SummaryInfo, SummaryItem, SummaryResult,
    WorkflowSummary,
};
pub use format::{OutputFormatter, OutputWriter};
