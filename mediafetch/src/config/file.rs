//! INI configuration file.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::debug;

use super::keys::ConfigKey;
use crate::error::{ConfigError, ConfigResult};
use crate::logging::LoggingConfig;
use crate::supervisor::{
    default_ffmpeg_location, default_search_path, ExecutableConfig, SupervisorConfig,
};

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "mediafetch";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default output template, resolved by yt-dlp.
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Path of the configuration file: `<config_dir>/mediafetch/config.ini`.
pub fn config_file_path() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// `[executable]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableSettings {
    pub path: Option<PathBuf>,
    pub resources_dir: Option<PathBuf>,
    /// Launcher command split on whitespace.
    pub launcher: Vec<String>,
    /// `None` inherits the caller's `PATH`.
    pub search_path: Option<String>,
    pub ffmpeg_location: Option<PathBuf>,
}

impl Default for ExecutableSettings {
    fn default() -> Self {
        Self {
            path: None,
            resources_dir: None,
            launcher: Vec::new(),
            search_path: default_search_path().map(|p| p.to_string_lossy().into_owned()),
            ffmpeg_location: default_ffmpeg_location(),
        }
    }
}

/// `[downloads]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub output_dir: PathBuf,
    pub output_template: String,
    /// Default format selector; `None` leaves the choice to yt-dlp.
    pub format: Option<String>,
}

impl DownloadSettings {
    /// The template joined onto the output directory.
    ///
    /// An absolute template is used as is.
    pub fn output_path_template(&self) -> String {
        self.output_dir
            .join(&self.output_template)
            .to_string_lossy()
            .into_owned()
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            output_template: DEFAULT_OUTPUT_TEMPLATE.to_string(),
            format: None,
        }
    }
}

/// The user's download directory, falling back to home, then the current
/// directory.
pub fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `info` or `mediafetch=debug`.
    pub level: String,
    /// Enables daily-rolling file logs when set.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

/// Contents of `config.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub executable: ExecutableSettings,
    pub downloads: DownloadSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default location, or defaults if the file does not exist.
    pub fn load() -> ConfigResult<Self> {
        let path = config_file_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from a specific file.
    ///
    /// Missing sections and keys keep their defaults; unknown ones are
    /// ignored.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_file_path()?)
    }

    /// Save to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }

        ini.write_to_file(path).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Saved config file");
        Ok(())
    }

    /// Supervisor settings from the `[executable]` section.
    pub fn supervisor_config(&self) -> SupervisorConfig {
        SupervisorConfig {
            executable: ExecutableConfig {
                path: self.executable.path.clone(),
                resources_dir: self.executable.resources_dir.clone(),
                launcher: self.executable.launcher.clone(),
            },
            search_path: self.executable.search_path.clone().map(OsString::from),
            ffmpeg_location: self.executable.ffmpeg_location.clone(),
        }
    }

    /// Logging settings from the `[logging]` section.
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.logging.level.clone(),
            directory: self.logging.directory.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.downloads.output_template, "%(title)s.%(ext)s");
        assert_eq!(config.downloads.format, None);
        assert_eq!(config.logging.level, "info");
        assert!(config.executable.launcher.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.executable.path = Some(PathBuf::from("/opt/yt-dlp"));
        config.executable.launcher = vec!["python3".into(), "-m".into(), "yt_dlp".into()];
        config.downloads.output_dir = PathBuf::from("/media/videos");
        config.downloads.format = Some("bestvideo+bestaudio".into());
        config.logging.directory = Some(temp.path().join("logs"));

        config.save_to(&path).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(
            &path,
            "[downloads]\nformat = 18\n\n[unrelated]\nkey = value\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.downloads.format.as_deref(), Some("18"));
        assert_eq!(config.downloads.output_template, DEFAULT_OUTPUT_TEMPLATE);
        assert_eq!(config.executable, ExecutableSettings::default());
    }

    #[test]
    fn test_empty_search_path_inherits() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[executable]\nsearch_path =\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.executable.search_path, None);
        assert_eq!(config.supervisor_config().search_path, None);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[downloads]\noutput_template =\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let err = ConfigFile::load_from(&temp.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_supervisor_config_bridge() {
        let mut config = ConfigFile::default();
        config.executable.path = Some(PathBuf::from("/opt/yt-dlp"));
        config.executable.search_path = Some("/usr/bin".into());
        config.executable.ffmpeg_location = Some(PathBuf::from("/opt/ffmpeg"));

        let supervisor = config.supervisor_config();
        assert_eq!(supervisor.executable.path, Some(PathBuf::from("/opt/yt-dlp")));
        assert_eq!(supervisor.search_path, Some(OsString::from("/usr/bin")));
        assert_eq!(supervisor.ffmpeg_location, Some(PathBuf::from("/opt/ffmpeg")));
    }

    #[test]
    fn test_output_path_template() {
        let downloads = DownloadSettings {
            output_dir: PathBuf::from("/media"),
            output_template: "%(title)s.%(ext)s".into(),
            format: None,
        };
        assert_eq!(
            PathBuf::from(downloads.output_path_template()),
            PathBuf::from("/media/%(title)s.%(ext)s")
        );
    }

    #[test]
    fn test_config_file_path_layout() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("mediafetch/config.ini"));
        }
    }
}
