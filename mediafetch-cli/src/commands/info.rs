//! Info command - show title and available formats for a URL.

use console::style;
use mediafetch::metadata::MediaInfo;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the info command.
pub fn run(url: &str, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("info");
    runner.require_executable()?;

    let info = runner.block_on(runner.service().fetch_metadata(url))?;
    print_info(&info);
    Ok(())
}

fn print_info(info: &MediaInfo) {
    println!("{}", style(&info.title).bold());
    println!("  Id:        {}", info.id);
    if let Some(duration) = info.duration_label() {
        println!("  Duration:  {}", duration);
    }
    if let Some(thumbnail) = &info.thumbnail {
        println!("  Thumbnail: {}", thumbnail);
    }
    println!();

    if info.formats.is_empty() {
        println!("No formats listed.");
        return;
    }

    println!("{}", style("Formats").bold());
    let width = info
        .formats
        .iter()
        .map(|f| f.format_id.len())
        .max()
        .unwrap_or(0);
    for format in &info.formats {
        println!("  {:<width$}  {}", format.format_id, format.label(), width = width);
    }
    println!();
    println!("Download with: mediafetch download <url> --format <id>");
}
