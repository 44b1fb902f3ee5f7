/// Report formatters for the per-handle results file
use chrono::Utc;
use serde_json::json;
use std::fmt;
use std::fmt::Write as _;

use super::RunSummary;
use crate::catalog::SiteTarget;
use crate::handle::Handle;
use crate::resolver::BatchResult;

/// Turns batch results into the text appended to a report file
pub trait Formatter: fmt::Debug + Send + Sync {
    /// File extension of reports written with this formatter
    fn extension(&self) -> &'static str;

    /// Written once, when the report file is created
    fn header(&self) -> Option<String>;

    fn format_batch(&self, handle: &Handle, batch: &BatchResult, anonymized: bool) -> String;

    fn format_run(&self, handle: &Handle, summary: &RunSummary) -> String;

    /// Free-form block such as the queued follow-up queries
    fn format_note(&self, handle: &Handle, title: &str, lines: &[String]) -> String;

    fn clone_box(&self) -> Box<dyn Formatter>;
}

impl Clone for Box<dyn Formatter> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub fn create_formatter(format: &str) -> Box<dyn Formatter> {
    match format.to_lowercase().as_str() {
        "json" => Box::new(JsonFormatter::new()),
        _ => Box::new(PlainFormatter::new()),
    }
}

/// Human-readable report, one section per batch
#[derive(Debug, Clone)]
pub struct PlainFormatter;

impl PlainFormatter {
    pub fn new() -> Self {
        PlainFormatter
    }

    fn write_list(out: &mut String, title: &str, handle: &Handle, sites: &[SiteTarget]) {
        let _ = writeln!(out, "\n{} of: {}", title, handle);
        if sites.is_empty() {
            out.push_str("(none)\n");
        }
        for site in sites {
            let _ = writeln!(out, "{}: {}", site.name, site.url);
        }
    }
}

impl Formatter for PlainFormatter {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn header(&self) -> Option<String> {
        Some("File generated by handlex.\n".to_string())
    }

    fn format_batch(&self, handle: &Handle, batch: &BatchResult, anonymized: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "\n=== {} catalog ({}) ===",
            batch.catalog,
            Utc::now().to_rfc3339()
        );

        Self::write_list(&mut out, "Confirmed users", handle, &batch.outcomes.confirmed);
        Self::write_list(
            &mut out,
            "Unconfirmed users (possible false positives)",
            handle,
            &batch.outcomes.unconfirmed,
        );
        Self::write_list(
            &mut out,
            "Sites needing manual review (HTTP 403)",
            handle,
            &batch.outcomes.manual_review,
        );

        let _ = writeln!(out, "\nSummary:");
        let _ = writeln!(out, "  confirmed: {}", batch.confirmed_count);
        let _ = writeln!(out, "  unconfirmed: {}", batch.outcomes.unconfirmed.len());
        let _ = writeln!(out, "  manual review: {}", batch.outcomes.manual_review.len());
        let _ = writeln!(out, "  sites probed: {}", batch.probed);
        let _ = writeln!(out, "  elapsed: {:.2}s", batch.elapsed_seconds);
        let _ = writeln!(out, "  anonymized transport: {}", yes_no(anonymized));

        out
    }

    fn format_run(&self, handle: &Handle, summary: &RunSummary) -> String {
        format!(
            "\n=== Run summary for {} ===\n  batches: {}\n  confirmed: {} of {} sites\n  elapsed: {:.2}s\n",
            handle,
            summary.batches,
            summary.confirmed,
            summary.probed,
            summary.elapsed_seconds
        )
    }

    fn format_note(&self, handle: &Handle, title: &str, lines: &[String]) -> String {
        let mut out = format!("\n{} for {}:\n", title, handle);
        for line in lines {
            let _ = writeln!(out, "  {}", line);
        }
        out
    }

    fn clone_box(&self) -> Box<dyn Formatter> {
        Box::new(self.clone())
    }
}

/// JSON Lines report, one object per batch, run summary or note
#[derive(Debug, Clone)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        JsonFormatter
    }
}

impl Formatter for JsonFormatter {
    fn extension(&self) -> &'static str {
        "jsonl"
    }

    fn header(&self) -> Option<String> {
        None
    }

    fn format_batch(&self, handle: &Handle, batch: &BatchResult, anonymized: bool) -> String {
        let record = json!({
            "type": "batch",
            "handle": handle.as_str(),
            "generated_at": Utc::now().to_rfc3339(),
            "anonymized": anonymized,
            "catalog": batch.catalog,
            "confirmed": batch.outcomes.confirmed,
            "unconfirmed": batch.outcomes.unconfirmed,
            "manual_review": batch.outcomes.manual_review,
            "confirmed_count": batch.confirmed_count,
            "probed": batch.probed,
            "dropped": batch.dropped,
            "elapsed_seconds": batch.elapsed_seconds,
            "slowest_probe_seconds": batch.slowest_probe_seconds,
        });
        format!("{}\n", record)
    }

    fn format_run(&self, handle: &Handle, summary: &RunSummary) -> String {
        let record = json!({
            "type": "run",
            "handle": handle.as_str(),
            "batches": summary.batches,
            "confirmed": summary.confirmed,
            "probed": summary.probed,
            "elapsed_seconds": summary.elapsed_seconds,
        });
        format!("{}\n", record)
    }

    fn format_note(&self, handle: &Handle, title: &str, lines: &[String]) -> String {
        let record = json!({
            "type": "note",
            "handle": handle.as_str(),
            "title": title,
            "lines": lines,
        });
        format!("{}\n", record)
    }

    fn clone_box(&self) -> Box<dyn Formatter> {
        Box::new(self.clone())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
