use tracing::info;

use crate::error::Result;
use crate::handle::Handle;
use crate::output::Reporter;

/// Query modifiers appended to the base `descr` command, in the order they
/// are queued
const DORK_MODIFIERS: &[&str] = &["docs", "email", "phone", "adr", "dbase"];

/// Hand-off point for extending a resolved handle into a broader search.
///
/// Receives the handle as an opaque value; nothing it does feeds back into
/// the resolver.
pub trait Escalation {
    fn escalate(&self, handle: &Handle) -> Result<()>;
}

/// Queues search-engine dork commands for the handle in its report, where the
/// query-compilation tooling picks them up.
pub struct DorkHandoff<'a> {
    reporter: &'a Reporter,
}

impl<'a> DorkHandoff<'a> {
    pub fn new(reporter: &'a Reporter) -> Self {
        DorkHandoff { reporter }
    }

    /// Commands in the `descr="<handle>"&<modifier>` form
    pub fn commands(handle: &Handle) -> Vec<String> {
        let base = format!("descr=\"{}\"", handle);

        std::iter::once(base.clone())
            .chain(
                DORK_MODIFIERS
                    .iter()
                    .map(|modifier| format!("{}&{}", base, modifier)),
            )
            .collect()
    }
}

impl Escalation for DorkHandoff<'_> {
    fn escalate(&self, handle: &Handle) -> Result<()> {
        let commands = Self::commands(handle);
        info!(handle = %handle, queued = commands.len(), "queueing dork queries");
        self.reporter.write_note(handle, "Queued dork queries", &commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::create_formatter;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_commands_cover_base_and_modifiers() {
        let handle = Handle::parse("john_doe").unwrap();
        let commands = DorkHandoff::commands(&handle);

        assert_eq!(
            commands,
            vec![
                "descr=\"john_doe\"",
                "descr=\"john_doe\"&docs",
                "descr=\"john_doe\"&email",
                "descr=\"john_doe\"&phone",
                "descr=\"john_doe\"&adr",
                "descr=\"john_doe\"&dbase",
            ]
        );
    }

    #[test]
    fn test_escalate_appends_to_report() {
        let dir = TempDir::new().unwrap();
        let handle = Handle::parse("john_doe").unwrap();
        let reporter = Reporter::new(dir.path(), &handle, create_formatter("plain"));

        DorkHandoff::new(&reporter).escalate(&handle).unwrap();

        let content = fs::read_to_string(reporter.path()).unwrap();
        assert!(content.contains("Queued dork queries for john_doe:"));
        assert!(content.contains("  descr=\"john_doe\"&email"));
    }
}
