use colored::*;

mod formatter;
mod writer;

pub use formatter::*;
pub use writer::*;

use crate::catalog::SiteTarget;
use crate::handle::Handle;
use crate::resolver::BatchResult;

/// Totals across every batch run for one handle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub batches: usize,
    pub confirmed: usize,
    pub probed: usize,
    pub elapsed_seconds: f64,
}

impl RunSummary {
    pub fn from_batches(batches: &[BatchResult]) -> Self {
        batches.iter().fold(RunSummary::default(), |acc, batch| RunSummary {
            batches: acc.batches + 1,
            confirmed: acc.confirmed + batch.confirmed_count,
            probed: acc.probed + batch.probed,
            elapsed_seconds: acc.elapsed_seconds + batch.elapsed_seconds,
        })
    }
}

fn print_sites(title: ColoredString, sites: &[SiteTarget]) {
    if sites.is_empty() {
        return;
    }

    println!("\n{}", title);
    for site in sites {
        println!("  {} {}", format!("{}:", site.name).bold(), site.url.underline());
    }
}

/// Prints the classified lists and figures of one batch
pub fn print_batch_summary(handle: &Handle, batch: &BatchResult, anonymized: bool) {
    println!(
        "\n{} {} catalog for '{}'",
        "==>".cyan().bold(),
        batch.catalog,
        handle.to_string().bold()
    );

    print_sites("Confirmed users".green().bold(), &batch.outcomes.confirmed);
    print_sites(
        "Unconfirmed (possible false positives)".yellow().bold(),
        &batch.outcomes.unconfirmed,
    );
    print_sites(
        "Manual review needed (HTTP 403)".magenta().bold(),
        &batch.outcomes.manual_review,
    );

    println!(
        "\nUser '{}' found on {} websites of {} in {:.2}s{}",
        handle.to_string().bold(),
        batch.confirmed_count.to_string().green(),
        batch.probed.to_string().cyan(),
        batch.elapsed_seconds,
        if anonymized { " (via Tor)" } else { "" }
    );
}

/// Prints the cross-batch totals
pub fn print_run_summary(handle: &Handle, summary: &RunSummary) {
    println!(
        "\n{} '{}': {} confirmed across {} sites in {} batch(es), {:.2}s total",
        "Summary for".bold(),
        handle,
        summary.confirmed.to_string().green().bold(),
        summary.probed,
        summary.batches,
        summary.elapsed_seconds
    );
}
