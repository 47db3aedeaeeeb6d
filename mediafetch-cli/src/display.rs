//! Terminal progress display for a single download.

use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use mediafetch::output::Phase;
use mediafetch::progress::ProgressSnapshot;

/// Bar resolution: one step per tenth of a percent.
const BAR_STEPS: u64 = 1000;

/// Progress bar fed by session snapshots.
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    /// Create a new progress bar for `url`.
    pub fn new(url: &str) -> Self {
        let bar = ProgressBar::new(BAR_STEPS);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_message(format!("Starting {}", url));
        Self { bar }
    }

    /// The process is running.
    pub fn started(&self) {
        self.bar.set_message("Waiting for yt-dlp...");
    }

    /// Show a new snapshot.
    pub fn update(&self, snapshot: &ProgressSnapshot) {
        self.bar.set_position(bar_position(snapshot.percent));
        self.bar.set_message(progress_message(snapshot));
    }

    /// Print a line above the bar.
    pub fn println(&self, line: &str) {
        self.bar.println(line);
    }

    /// Finish at 100% and print where the file went.
    pub fn completed(&self, snapshot: &ProgressSnapshot, path: &Path) {
        self.bar.set_position(BAR_STEPS);
        self.bar.finish_with_message(format!(
            "{} {}",
            style("Done").green().bold(),
            snapshot.total_label()
        ));
        println!("{} {}", style("Saved:").bold(), path.display());
    }

    /// Leave the bar where it stopped with a failure message.
    pub fn failed(&self, message: &str) {
        self.bar
            .abandon_with_message(format!("{} {}", style("Failed").red().bold(), message));
    }

    /// Leave the bar where it stopped after cancellation.
    pub fn cancelled(&self) {
        self.bar
            .abandon_with_message(style("Cancelled").yellow().bold().to_string());
    }
}

/// Bar position for a percentage.
pub fn bar_position(percent: f64) -> u64 {
    ((percent.clamp(0.0, 100.0) / 100.0) * BAR_STEPS as f64).round() as u64
}

/// Status line for a snapshot.
pub fn progress_message(snapshot: &ProgressSnapshot) -> String {
    match snapshot.phase {
        Phase::Merging => format!("{:>5.1}% • merging...", snapshot.percent),
        Phase::Downloading => format!(
            "{:>5.1}% • {} / {} • {} • ETA {}",
            snapshot.percent,
            snapshot.downloaded_label(),
            snapshot.total_label(),
            snapshot.rate_label,
            snapshot.eta_label
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downloading_message() {
        let snapshot = ProgressSnapshot {
            percent: 45.2,
            downloaded_bytes: Some(1536),
            total_bytes: Some(10 * 1024 * 1024),
            rate_label: "1.50 MiB/s".into(),
            eta_label: "00:07".into(),
            phase: Phase::Downloading,
        };
        assert_eq!(
            progress_message(&snapshot),
            " 45.2% • 1.5 KB / 10 MB • 1.50 MiB/s • ETA 00:07"
        );
    }

    #[test]
    fn test_unknown_fields_show_question_marks() {
        let snapshot = ProgressSnapshot {
            percent: 3.0,
            ..ProgressSnapshot::initial()
        };
        assert_eq!(progress_message(&snapshot), "  3.0% • ? / ? • ? • ETA ?");
    }

    #[test]
    fn test_merging_message() {
        let snapshot = ProgressSnapshot {
            percent: 99.9,
            phase: Phase::Merging,
            ..ProgressSnapshot::initial()
        };
        assert_eq!(progress_message(&snapshot), " 99.9% • merging...");
    }

    #[test]
    fn test_bar_position() {
        assert_eq!(bar_position(0.0), 0);
        assert_eq!(bar_position(45.2), 452);
        assert_eq!(bar_position(99.9), 999);
        assert_eq!(bar_position(150.0), 1000);
    }
}
