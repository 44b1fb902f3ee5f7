use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
}

impl ProgressManager {
    /// Creates a manager; with `hidden` set every bar it hands out draws nothing
    pub fn new(hidden: bool) -> Self {
        let multi_progress = if hidden {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };

        ProgressManager { multi_progress }
    }

    /// Bar advanced once per probed site of a batch
    pub fn create_batch_bar(&self, catalog: &str, total: usize) -> ProgressBar {
        let style = ProgressStyle::with_template(
            "{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} {elapsed_precise} {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

        let bar = self.multi_progress.add(ProgressBar::new(total as u64));
        bar.set_style(style);
        bar.set_prefix(format!("{:<12}", catalog));
        bar.enable_steady_tick(Duration::from_millis(100));

        bar
    }
}
