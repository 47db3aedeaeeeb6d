//! Persistent settings in `<config_dir>/mediafetch/config.ini`.
//!
//! ```ini
//! [executable]
//! path =
//! resources_dir =
//! launcher =
//! search_path = /usr/local/bin:/usr/bin:/bin:/usr/sbin:/sbin
//! ffmpeg_location =
//!
//! [downloads]
//! output_dir = /home/user/Downloads
//! output_template = %(title)s.%(ext)s
//! format =
//!
//! [logging]
//! level = info
//! directory =
//! ```
//!
//! [`ConfigFile::supervisor_config`] and [`ConfigFile::logging_config`]
//! translate the file into the runtime configuration types.

mod file;
mod keys;

pub use file::{
    config_file_path, default_output_dir, ConfigFile, DownloadSettings, ExecutableSettings,
    LoggingSettings, CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL,
    DEFAULT_OUTPUT_TEMPLATE,
};
pub use keys::ConfigKey;
