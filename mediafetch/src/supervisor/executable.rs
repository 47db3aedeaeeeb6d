//! Locating the yt-dlp executable.
//!
//! Resolution order:
//!
//! 1. A configured launcher (`python -m yt_dlp`) names the whole command.
//! 2. An explicit executable path.
//! 3. The bundled copy at `<resources>/yt-dlp/<platform>/<binary>` if it exists.
//! 4. The bare program name, looked up on `PATH` at spawn time.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Program name used when nothing else is configured.
pub const DEFAULT_PROGRAM: &str = "yt-dlp";

/// `PATH` given to spawned processes on Unix.
pub const DEFAULT_SEARCH_PATH: &str = "/usr/local/bin:/usr/bin:/bin:/usr/sbin:/sbin";

/// Directory under the resources root that holds the bundled binaries.
pub const BUNDLED_DIR: &str = "yt-dlp";

/// Per-platform directory name inside the bundled layout.
pub fn platform_dir() -> &'static str {
    if cfg!(windows) {
        "win"
    } else if cfg!(target_os = "macos") {
        "mac"
    } else {
        "linux"
    }
}

/// File name of the executable on this platform.
pub fn binary_name() -> &'static str {
    if cfg!(windows) {
        "yt-dlp.exe"
    } else {
        DEFAULT_PROGRAM
    }
}

/// Where the bundled executable lives under a resources root.
pub fn bundled_path(resources_dir: &Path) -> PathBuf {
    resources_dir
        .join(BUNDLED_DIR)
        .join(platform_dir())
        .join(binary_name())
}

/// How the executable should be found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutableConfig {
    /// Explicit path to the executable.
    pub path: Option<PathBuf>,
    /// Root of the bundled resources layout.
    pub resources_dir: Option<PathBuf>,
    /// Launcher command; the first word is the program, the rest are
    /// leading arguments.
    pub launcher: Vec<String>,
}

impl ExecutableConfig {
    /// Resolve the configuration into a concrete program and leading arguments.
    pub fn resolve(&self) -> ExecutableSpec {
        if let Some((program, rest)) = self.launcher.split_first() {
            return ExecutableSpec {
                program: PathBuf::from(program),
                leading_args: rest.iter().map(OsString::from).collect(),
            };
        }

        if let Some(path) = &self.path {
            return ExecutableSpec::program(path.clone());
        }

        if let Some(bundled) = self.resources_dir.as_deref().map(bundled_path) {
            if bundled.is_file() {
                return ExecutableSpec::program(bundled);
            }
        }

        ExecutableSpec::program(PathBuf::from(DEFAULT_PROGRAM))
    }
}

/// A resolved command: the program plus any arguments that precede the
/// yt-dlp argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableSpec {
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments inserted before the per-invocation arguments.
    pub leading_args: Vec<OsString>,
}

impl ExecutableSpec {
    /// Create a spec for a bare program with no leading arguments.
    pub fn program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Whether the program names a path rather than a bare command name.
    pub fn is_path(&self) -> bool {
        self.program.components().count() > 1 || self.program.is_absolute()
    }

    /// Find the program on disk.
    ///
    /// Paths are checked directly. Bare names are looked up in `search_path`
    /// first, then in the inherited `PATH`, so a per-user install outside
    /// the pinned directories is still found.
    pub fn locate(&self, search_path: Option<&OsStr>) -> Option<PathBuf> {
        if self.is_path() {
            return self.program.is_file().then(|| self.program.clone());
        }

        let pinned = search_path.and_then(|paths| {
            let cwd = std::env::current_dir().ok()?;
            which::which_in(&self.program, Some(paths), cwd).ok()
        });
        pinned.or_else(|| which::which(&self.program).ok())
    }

    /// The spec with a bare program name replaced by its located path.
    ///
    /// Unchanged when the program is already a path or cannot be found.
    pub fn located(&self, search_path: Option<&OsStr>) -> ExecutableSpec {
        match self.locate(search_path) {
            Some(program) if !self.is_path() => ExecutableSpec {
                program,
                leading_args: self.leading_args.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Whether the program can be found.
    pub fn is_available(&self, search_path: Option<&OsStr>) -> bool {
        self.locate(search_path).is_some()
    }
}
