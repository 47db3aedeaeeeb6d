//! Named configuration keys (`section.key`) with typed get/set.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use super::file::{default_output_dir, ConfigFile};
use crate::error::{ConfigError, ConfigResult};

/// Every setting in `config.ini`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ExecutablePath,
    ExecutableResourcesDir,
    ExecutableLauncher,
    ExecutableSearchPath,
    ExecutableFfmpegLocation,
    DownloadsOutputDir,
    DownloadsOutputTemplate,
    DownloadsFormat,
    LoggingLevel,
    LoggingDirectory,
}

const ALL_KEYS: [ConfigKey; 10] = [
    ConfigKey::ExecutablePath,
    ConfigKey::ExecutableResourcesDir,
    ConfigKey::ExecutableLauncher,
    ConfigKey::ExecutableSearchPath,
    ConfigKey::ExecutableFfmpegLocation,
    ConfigKey::DownloadsOutputDir,
    ConfigKey::DownloadsOutputTemplate,
    ConfigKey::DownloadsFormat,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingDirectory,
];

impl ConfigKey {
    /// All keys, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Full name, e.g. `downloads.format`.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ExecutablePath => "executable.path",
            ConfigKey::ExecutableResourcesDir => "executable.resources_dir",
            ConfigKey::ExecutableLauncher => "executable.launcher",
            ConfigKey::ExecutableSearchPath => "executable.search_path",
            ConfigKey::ExecutableFfmpegLocation => "executable.ffmpeg_location",
            ConfigKey::DownloadsOutputDir => "downloads.output_dir",
            ConfigKey::DownloadsOutputTemplate => "downloads.output_template",
            ConfigKey::DownloadsFormat => "downloads.format",
            ConfigKey::LoggingLevel => "logging.level",
            ConfigKey::LoggingDirectory => "logging.directory",
        }
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        self.split().0
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let name = self.name();
        name.split_once('.').unwrap_or((name, ""))
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ExecutablePath => path_string(&config.executable.path),
            ConfigKey::ExecutableResourcesDir => path_string(&config.executable.resources_dir),
            ConfigKey::ExecutableLauncher => config.executable.launcher.join(" "),
            ConfigKey::ExecutableSearchPath => {
                config.executable.search_path.clone().unwrap_or_default()
            }
            ConfigKey::ExecutableFfmpegLocation => {
                path_string(&config.executable.ffmpeg_location)
            }
            ConfigKey::DownloadsOutputDir => {
                config.downloads.output_dir.to_string_lossy().into_owned()
            }
            ConfigKey::DownloadsOutputTemplate => config.downloads.output_template.clone(),
            ConfigKey::DownloadsFormat => config.downloads.format.clone().unwrap_or_default(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => path_string(&config.logging.directory),
        }
    }

    /// Set the value from a string. An empty value clears optional settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty output template or
    /// a log level that is not a valid filter directive.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> ConfigResult<()> {
        let value = value.trim();
        match self {
            ConfigKey::ExecutablePath => config.executable.path = optional_path(value),
            ConfigKey::ExecutableResourcesDir => {
                config.executable.resources_dir = optional_path(value)
            }
            ConfigKey::ExecutableLauncher => {
                config.executable.launcher = value.split_whitespace().map(String::from).collect()
            }
            ConfigKey::ExecutableSearchPath => {
                config.executable.search_path = optional_string(value)
            }
            ConfigKey::ExecutableFfmpegLocation => {
                config.executable.ffmpeg_location = optional_path(value)
            }
            ConfigKey::DownloadsOutputDir => {
                config.downloads.output_dir =
                    optional_path(value).unwrap_or_else(default_output_dir)
            }
            ConfigKey::DownloadsOutputTemplate => {
                if value.is_empty() {
                    return Err(self.invalid(value, "output template must not be empty"));
                }
                config.downloads.output_template = value.to_string();
            }
            ConfigKey::DownloadsFormat => config.downloads.format = optional_string(value),
            ConfigKey::LoggingLevel => {
                if value.is_empty() {
                    return Err(self.invalid(value, "log level must not be empty"));
                }
                EnvFilter::try_new(value).map_err(|e| self.invalid(value, &e.to_string()))?;
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingDirectory => config.logging.directory = optional_path(value),
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name().to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn path_string(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn optional_string(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_names() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
            assert_eq!(format!("{}.{}", key.section(), key.key_name()), key.name());
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "Downloads.Format".parse::<ConfigKey>().unwrap(),
            ConfigKey::DownloadsFormat
        );
    }

    #[test]
    fn test_unknown_key() {
        let err = "downloads.colour".parse::<ConfigKey>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(ref k) if k == "downloads.colour"));
    }

    #[test]
    fn test_sections_are_grouped() {
        let sections: Vec<&str> = ConfigKey::all().iter().map(|k| k.section()).collect();
        let mut deduped = sections.clone();
        deduped.dedup();
        assert_eq!(deduped, vec!["executable", "downloads", "logging"]);
    }

    #[test]
    fn test_set_and_get_launcher() {
        let mut config = ConfigFile::default();
        ConfigKey::ExecutableLauncher
            .set(&mut config, "  python3   -m yt_dlp ")
            .unwrap();
        assert_eq!(config.executable.launcher, vec!["python3", "-m", "yt_dlp"]);
        assert_eq!(ConfigKey::ExecutableLauncher.get(&config), "python3 -m yt_dlp");
    }

    #[test]
    fn test_empty_clears_optional() {
        let mut config = ConfigFile::default();
        ConfigKey::DownloadsFormat.set(&mut config, "18").unwrap();
        assert_eq!(ConfigKey::DownloadsFormat.get(&config), "18");

        ConfigKey::DownloadsFormat.set(&mut config, "").unwrap();
        assert_eq!(config.downloads.format, None);
        assert_eq!(ConfigKey::DownloadsFormat.get(&config), "");
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = ConfigFile::default();
        ConfigKey::LoggingLevel
            .set(&mut config, "mediafetch=debug")
            .unwrap();
        assert_eq!(config.logging.level, "mediafetch=debug");

        let err = ConfigKey::LoggingLevel
            .set(&mut config, "mediafetch=loud")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(config.logging.level, "mediafetch=debug");
    }

    #[test]
    fn test_empty_output_template_rejected() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::DownloadsOutputTemplate.set(&mut config, " ").is_err());
        assert_eq!(config.downloads.output_template, "%(title)s.%(ext)s");
    }
}
