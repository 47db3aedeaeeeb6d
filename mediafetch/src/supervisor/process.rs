//! Spawning and supervising yt-dlp processes.
//!
//! [`ProcessSupervisor::start`] registers the download, spawns the process and
//! hands a self-driving [`DownloadContext`] to the tokio runtime:
//!
//! ```text
//! start(id, request)
//!    │
//!    ├── registry.reserve(id)        ──► DuplicateIdentifier
//!    ├── Command::spawn()            ──► Failed (entry released)
//!    ├── registry.mark_running(id)
//!    └── runtime.spawn(context.run())
//!              │
//!              ├── pump_stdout ──► Log / Sample, last destination
//!              ├── pump_stderr ──► Log("[stderr] ..."), collected text
//!              └── select! { child.wait(), cancellation.cancelled() }
//!                        │
//!                        ├── exited    ──► release(id, generation) ──► Completed | Failed
//!                        └── cancelled ──► kill, reap (cancel() already reported)
//! ```

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::args::build_download_args;
use super::events::SupervisorEvent;
use super::executable::{ExecutableConfig, ExecutableSpec, DEFAULT_SEARCH_PATH};
use super::registry::DownloadRegistry;
use super::request::{DownloadId, DownloadRequest};
use super::streams::{pump_stderr, pump_stdout};
use crate::error::{describe_exit, SupervisorError, SupervisorResult};
use crate::output::{OutputParser, YtDlpTextParser};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// ffmpeg location passed on macOS when it is installed there.
pub const MACOS_FFMPEG_LOCATION: &str = "/usr/local/bin/ffmpeg";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the process supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// How to find the executable.
    pub executable: ExecutableConfig,

    /// `PATH` for spawned processes. `None` inherits the caller's.
    pub search_path: Option<OsString>,

    /// Passed as `--ffmpeg-location` when set.
    pub ffmpeg_location: Option<PathBuf>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            executable: ExecutableConfig::default(),
            search_path: default_search_path(),
            ffmpeg_location: default_ffmpeg_location(),
        }
    }
}

/// Pinned `PATH` on Unix; inherited elsewhere.
pub fn default_search_path() -> Option<OsString> {
    cfg!(unix).then(|| OsString::from(DEFAULT_SEARCH_PATH))
}

/// The Homebrew-style ffmpeg on macOS if present.
pub fn default_ffmpeg_location() -> Option<PathBuf> {
    if !cfg!(target_os = "macos") {
        return None;
    }
    let location = PathBuf::from(MACOS_FFMPEG_LOCATION);
    location.is_file().then_some(location)
}

/// Build a command for the resolved executable.
///
/// Output is piped, stdin is closed, and the child is killed if its handle
/// is dropped.
pub(crate) fn build_command(
    executable: &ExecutableSpec,
    search_path: Option<&OsStr>,
    args: &[OsString],
) -> Command {
    let mut command = Command::new(&executable.program);
    command
        .args(&executable.leading_args)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(path) = search_path {
        command.env("PATH", path);
    }

    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);

    command
}

// =============================================================================
// Supervisor
// =============================================================================

/// Owns the lifecycle of one external process per logical download.
pub struct ProcessSupervisor {
    config: SupervisorConfig,
    executable: ExecutableSpec,
    registry: Arc<DownloadRegistry>,
    parser: Arc<dyn OutputParser>,
}

impl ProcessSupervisor {
    /// Create a supervisor with its own registry and the yt-dlp text parser.
    pub fn new(config: SupervisorConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(DownloadRegistry::new()),
            Arc::new(YtDlpTextParser::new()),
        )
    }

    /// Create a supervisor with an explicit registry and parser.
    ///
    /// # Arguments
    ///
    /// * `config` - Executable and environment configuration
    /// * `registry` - Registry of active downloads
    /// * `parser` - Classifier applied to each stdout line
    pub fn with_parts(
        config: SupervisorConfig,
        registry: Arc<DownloadRegistry>,
        parser: Arc<dyn OutputParser>,
    ) -> Self {
        let executable = config.executable.resolve();
        debug!(program = %executable.program.display(), "Resolved yt-dlp executable");
        Self {
            config,
            executable,
            registry,
            parser,
        }
    }

    /// The supervisor's configuration.
    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// The resolved executable.
    pub fn executable(&self) -> &ExecutableSpec {
        &self.executable
    }

    /// The registry of active downloads.
    pub fn registry(&self) -> &Arc<DownloadRegistry> {
        &self.registry
    }

    /// Whether the resolved executable can be found.
    pub fn check_executable(&self) -> bool {
        let available = self
            .executable
            .is_available(self.config.search_path.as_deref());
        if !available {
            warn!(program = %self.executable.program.display(), "yt-dlp executable not found");
        }
        available
    }

    /// Build a command running the executable with `args`.
    ///
    /// A bare program name is resolved first, since the child's pinned
    /// `PATH` may not contain the directory it was found in.
    pub(crate) fn command(&self, args: &[OsString]) -> Command {
        let search_path = self.config.search_path.as_deref();
        build_command(&self.executable.located(search_path), search_path, args)
    }

    /// Start a download.
    ///
    /// Must be called from within a tokio runtime. Returns the receiving end
    /// of the download's private event channel; a launch failure arrives
    /// there as [`SupervisorEvent::Failed`].
    ///
    /// # Errors
    ///
    /// * [`SupervisorError::DuplicateIdentifier`] if `id` is already active
    /// * [`SupervisorError::NoRuntime`] outside a tokio runtime
    pub fn start(
        &self,
        id: DownloadId,
        request: DownloadRequest,
    ) -> SupervisorResult<mpsc::UnboundedReceiver<SupervisorEvent>> {
        let runtime = Handle::try_current().map_err(|_| SupervisorError::NoRuntime(id.clone()))?;

        let (events, receiver) = mpsc::unbounded_channel();
        let reservation = self.registry.reserve(&id, events.clone())?;

        let args = build_download_args(&request, self.config.ffmpeg_location.as_deref());
        debug!(
            download = %id,
            program = %self.executable.program.display(),
            args = ?args,
            "Spawning yt-dlp"
        );

        let child = match self.command(&args).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(download = %id, error = %e, "Failed to launch yt-dlp");
                if self.registry.release(&id, reservation.generation) {
                    let _ = events.send(SupervisorEvent::Failed {
                        message: format!("Spawn error: {e}"),
                        exit_code: None,
                    });
                }
                return Ok(receiver);
            }
        };

        let pid = child.id();
        self.registry.mark_running(&id, reservation.generation, pid);
        let _ = events.send(SupervisorEvent::Started { pid });
        info!(download = %id, pid = ?pid, url = %request.url, "Download started");

        let context = DownloadContext {
            id,
            generation: reservation.generation,
            child,
            cancellation: reservation.cancellation,
            events,
            registry: Arc::clone(&self.registry),
            parser: Arc::clone(&self.parser),
            fallback_path: PathBuf::from(request.output_template),
        };
        runtime.spawn(context.run());

        Ok(receiver)
    }

    /// Cancel a download with a hard kill.
    ///
    /// Removes the registry entry and emits [`SupervisorEvent::Cancelled`].
    /// Returns false, doing nothing, when `id` is not active. Partial files
    /// are left on disk.
    pub fn cancel(&self, id: &DownloadId) -> bool {
        let Some(taken) = self.registry.take(id) else {
            debug!(download = %id, "Cancel ignored, download not active");
            return false;
        };

        taken.cancellation.cancel();
        let _ = taken.events.send(SupervisorEvent::Cancelled);
        info!(download = %id, pid = ?taken.pid, state = %taken.state, "Download cancelled");
        true
    }
}

// =============================================================================
// Download context
// =============================================================================

/// Drives one spawned process to its end.
struct DownloadContext {
    id: DownloadId,
    generation: u64,
    child: Child,
    cancellation: CancellationToken,
    events: mpsc::UnboundedSender<SupervisorEvent>,
    registry: Arc<DownloadRegistry>,
    parser: Arc<dyn OutputParser>,
    fallback_path: PathBuf,
}

impl DownloadContext {
    async fn run(mut self) {
        let stdout_task = self.child.stdout.take().map(|stdout| {
            tokio::spawn(pump_stdout(
                stdout,
                Arc::clone(&self.parser),
                self.events.clone(),
            ))
        });
        let stderr_task = self
            .child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(pump_stderr(stderr, self.events.clone())));

        let status = tokio::select! {
            status = self.child.wait() => Some(status),
            () = self.cancellation.cancelled() => None,
        };

        let Some(status) = status else {
            self.kill().await;
            return;
        };

        // Exit is only final once both streams are drained
        let destination = match stdout_task {
            Some(task) => task.await.ok().flatten(),
            None => None,
        };
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if !self.registry.release(&self.id, self.generation) {
            debug!(download = %self.id, "Exit after cancellation, outcome already reported");
            return;
        }

        let event = match status {
            Ok(status) => self.outcome(status, destination.map(|d| d.path), &stderr),
            Err(e) => {
                warn!(download = %self.id, error = %e, "Failed to wait for yt-dlp");
                Some(SupervisorEvent::Failed {
                    message: format!("Failed to wait for process: {e}"),
                    exit_code: None,
                })
            }
        };

        if let Some(event) = event {
            let _ = self.events.send(event);
        }
    }

    fn outcome(
        &self,
        status: ExitStatus,
        destination: Option<PathBuf>,
        stderr: &str,
    ) -> Option<SupervisorEvent> {
        match status.code() {
            Some(0) => {
                let path = destination.unwrap_or_else(|| self.fallback_path.clone());
                info!(download = %self.id, path = %path.display(), "Download completed");
                Some(SupervisorEvent::Completed { path })
            }
            Some(code) => {
                warn!(download = %self.id, code, "Download failed");
                Some(SupervisorEvent::Failed {
                    message: failure_message(Some(code), stderr),
                    exit_code: Some(code),
                })
            }
            None => {
                warn!(download = %self.id, "yt-dlp terminated by a signal");
                None
            }
        }
    }

    async fn kill(&mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!(download = %self.id, error = %e, "Kill failed, process already gone");
        }
        let _ = self.child.wait().await;
        debug!(download = %self.id, "Cancelled process reaped");
    }
}

/// Failure text for a non-zero exit, with stderr appended when present.
pub(crate) fn failure_message(code: Option<i32>, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("Process exited with {}", describe_exit(&code))
    } else {
        format!("Process exited with {}: {stderr}", describe_exit(&code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message() {
        assert_eq!(failure_message(Some(1), ""), "Process exited with code 1");
        assert_eq!(
            failure_message(Some(2), "ERROR: Unsupported URL\n"),
            "Process exited with code 2: ERROR: Unsupported URL"
        );
    }

    #[test]
    fn test_default_search_path_pinned_on_unix() {
        let path = default_search_path();
        if cfg!(unix) {
            assert_eq!(path, Some(OsString::from(DEFAULT_SEARCH_PATH)));
        } else {
            assert_eq!(path, None);
        }
    }

    #[test]
    fn test_build_command_prepends_leading_args() {
        let spec = ExecutableSpec {
            program: PathBuf::from("python3"),
            leading_args: vec!["-m".into(), "yt_dlp".into()],
        };
        let command = build_command(&spec, None, &["--version".into()]);
        let std_command = command.as_std();

        assert_eq!(std_command.get_program(), "python3");
        let args: Vec<&OsStr> = std_command.get_args().collect();
        assert_eq!(args, vec!["-m", "yt_dlp", "--version"]);
    }

    #[test]
    fn test_build_command_pins_path() {
        let spec = ExecutableSpec::program("yt-dlp");
        let command = build_command(&spec, Some(OsStr::new("/usr/bin")), &[]);
        let path = command
            .as_std()
            .get_envs()
            .find(|(key, _)| *key == "PATH")
            .and_then(|(_, value)| value);
        assert_eq!(path, Some(OsStr::new("/usr/bin")));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_resolves_program_outside_pinned_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let supervisor = ProcessSupervisor::new(SupervisorConfig {
            executable: ExecutableConfig {
                launcher: vec!["sh".into(), "-c".into(), "true".into()],
                ..Default::default()
            },
            search_path: Some(temp.path().as_os_str().to_owned()),
            ffmpeg_location: None,
        });

        let command = supervisor.command(&[]);
        let program = PathBuf::from(command.as_std().get_program());
        assert!(program.is_absolute());
        assert!(program.ends_with("sh"));
        assert!(supervisor.check_executable());
    }

    #[test]
    fn test_start_outside_runtime_is_rejected() {
        let supervisor = ProcessSupervisor::new(SupervisorConfig::default());
        let err = supervisor
            .start(DownloadId::new("x"), DownloadRequest::new("u", "t"))
            .unwrap_err();
        assert!(matches!(err, SupervisorError::NoRuntime(_)));
        assert!(supervisor.registry().is_empty());
    }

    #[test]
    fn test_cancel_unknown_is_noop() {
        let supervisor = ProcessSupervisor::new(SupervisorConfig::default());
        assert!(!supervisor.cancel(&DownloadId::new("nobody")));
    }
}
