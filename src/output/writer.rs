use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{Formatter, RunSummary};
use crate::error::{ResolveError, Result};
use crate::handle::Handle;
use crate::resolver::BatchResult;

/// Append-only report file for one handle
#[derive(Debug, Clone)]
pub struct Reporter {
    path: PathBuf,
    formatter: Box<dyn Formatter>,
}

impl Reporter {
    /// Report for `handle` inside `dir`, named `users_<handle>_results.<ext>`
    pub fn new(dir: &Path, handle: &Handle, formatter: Box<dyn Formatter>) -> Self {
        let path = dir.join(format!(
            "users_{}_results.{}",
            sanitize(handle.as_str()),
            formatter.extension()
        ));

        Reporter { path, formatter }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_batch(&self, handle: &Handle, batch: &BatchResult, anonymized: bool) -> Result<()> {
        self.append(&self.formatter.format_batch(handle, batch, anonymized))
    }

    pub fn write_run(&self, handle: &Handle, summary: &RunSummary) -> Result<()> {
        self.append(&self.formatter.format_run(handle, summary))
    }

    pub fn write_note(&self, handle: &Handle, title: &str, lines: &[String]) -> Result<()> {
        self.append(&self.formatter.format_note(handle, title, lines))
    }

    fn append(&self, text: &str) -> Result<()> {
        let io_error = |source: std::io::Error| ResolveError::Report {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let is_new = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_error)?;

        if is_new {
            if let Some(header) = self.formatter.header() {
                file.write_all(header.as_bytes()).map_err(io_error)?;
            }
        }

        file.write_all(text.as_bytes()).map_err(io_error)?;
        debug!(path = %self.path.display(), bytes = text.len(), "report appended");
        Ok(())
    }
}

/// Percent-encodes a handle for use in a file name.
///
/// Only ASCII alphanumerics and `-_.~` pass through, so distinct handles
/// always map to distinct names.
fn sanitize(handle: &str) -> String {
    urlencoding::encode(handle).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogKind, SiteTarget};
    use crate::output::create_formatter;
    use crate::resolver::BatchOutcomes;
    use tempfile::TempDir;

    fn batch(kind: CatalogKind, confirmed: &[&str]) -> BatchResult {
        BatchResult {
            catalog: kind,
            confirmed_count: confirmed.len(),
            elapsed_seconds: 1.0,
            probed: confirmed.len(),
            dropped: 0,
            slowest_probe_seconds: 0.5,
            outcomes: BatchOutcomes {
                confirmed: confirmed
                    .iter()
                    .map(|name| SiteTarget {
                        name: name.to_string(),
                        url: format!("https://{}.test/alice", name),
                    })
                    .collect(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_report_path_uses_handle_and_extension() {
        let handle = Handle::parse("alice").unwrap();
        let reporter = Reporter::new(Path::new("reports"), &handle, create_formatter("json"));
        assert_eq!(reporter.path(), Path::new("reports/users_alice_results.jsonl"));
    }

    #[test]
    fn test_sanitize_encodes_path_separators() {
        assert_eq!(sanitize("a/b\\c:d"), "a%2Fb%5Cc%3Ad");
        assert_eq!(sanitize("john_doe"), "john_doe");
        assert_eq!(sanitize("john.doe-1"), "john.doe-1");
    }

    #[test]
    fn test_distinct_handles_get_distinct_reports() {
        let formatter = create_formatter("plain");
        let slash = Reporter::new(
            Path::new("reports"),
            &Handle::parse("a/b").unwrap(),
            formatter.clone(),
        );
        let underscore = Reporter::new(
            Path::new("reports"),
            &Handle::parse("a_b").unwrap(),
            formatter.clone(),
        );
        let percent = Reporter::new(
            Path::new("reports"),
            &Handle::parse("a%2Fb").unwrap(),
            formatter,
        );

        assert_eq!(underscore.path(), Path::new("reports/users_a_b_results.txt"));
        assert_ne!(slash.path(), underscore.path());
        assert_ne!(slash.path(), percent.path());
    }

    #[test]
    fn test_plain_report_appends_batches_in_order() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let handle = Handle::parse("alice").unwrap();
        let reporter = Reporter::new(&dir.path().join("users"), &handle, create_formatter("plain"));

        reporter.write_batch(&handle, &batch(CatalogKind::General, &["github"]), false)?;
        reporter.write_batch(&handle, &batch(CatalogKind::Restricted, &["fetlife"]), false)?;

        let content = fs::read_to_string(reporter.path())?;
        assert!(content.starts_with("File generated by handlex.\n"));
        assert_eq!(content.matches("File generated by handlex.").count(), 1);

        let general = content.find("=== general catalog").unwrap();
        let restricted = content.find("=== restricted catalog").unwrap();
        assert!(general < restricted);
        assert!(content.contains("github: https://github.test/alice"));
        assert!(content.contains("fetlife: https://fetlife.test/alice"));

        Ok(())
    }

    #[test]
    fn test_json_report_has_one_line_per_record() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let handle = Handle::parse("alice").unwrap();
        let reporter = Reporter::new(dir.path(), &handle, create_formatter("json"));

        reporter.write_batch(&handle, &batch(CatalogKind::General, &["github"]), true)?;
        reporter.write_run(
            &handle,
            &RunSummary {
                batches: 1,
                confirmed: 1,
                probed: 1,
                elapsed_seconds: 1.0,
            },
        )?;
        reporter.write_note(&handle, "Queued dork queries", &["descr=\"alice\"".to_string()])?;

        let content = fs::read_to_string(reporter.path())?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            serde_json::from_str::<serde_json::Value>(line)?;
        }

        Ok(())
    }
}
