//! Check command - report which yt-dlp would be used.

use std::ffi::OsStr;
use std::path::Path;

use console::style;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the check command.
pub fn run(runner: &CliRunner) -> Result<(), CliError> {
    let supervisor = runner.service().supervisor();
    let executable = supervisor.executable();
    let search_path = supervisor.config().search_path.as_deref();

    println!("Program:     {}", executable.program.display());
    if !executable.leading_args.is_empty() {
        let args: Vec<_> = executable
            .leading_args
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect();
        println!("Launcher:    {}", args.join(" "));
    }
    match search_path {
        Some(path) => println!("Search PATH: {}", path.to_string_lossy()),
        None => println!("Search PATH: (inherited)"),
    }
    if let Some(ffmpeg) = &supervisor.config().ffmpeg_location {
        println!("ffmpeg:      {}", ffmpeg.display());
    }

    match executable.locate(search_path) {
        Some(found) => {
            println!("{} {}", style("Found:").green().bold(), found.display());
            if let (false, Some(pinned)) = (executable.is_path(), search_path) {
                if !in_search_path(&found, pinned) {
                    println!(
                        "{} found through the inherited PATH, not the search PATH above",
                        style("Note:").yellow().bold()
                    );
                }
            }
            Ok(())
        }
        None => Err(CliError::ExecutableMissing(
            executable.program.display().to_string(),
        )),
    }
}

/// Whether `program` lives directly in one of the `search_path` directories.
fn in_search_path(program: &Path, search_path: &OsStr) -> bool {
    program
        .parent()
        .is_some_and(|dir| std::env::split_paths(search_path).any(|entry| entry == dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_program_in_search_path() {
        let search = OsStr::new("/usr/local/bin:/usr/bin");
        assert!(in_search_path(Path::new("/usr/bin/yt-dlp"), search));
        assert!(!in_search_path(Path::new("/home/u/.local/bin/yt-dlp"), search));
    }
}
