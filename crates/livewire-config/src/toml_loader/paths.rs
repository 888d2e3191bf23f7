//! Where the config file lives, and seeding it on first run.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use livewire_common::ConfigError;
use tracing::{debug, info};

use super::template::default_config_toml;

const APP_DIR: &str = "livewire";
const FILE_NAME: &str = "config.toml";

/// `<platform config dir>/livewire/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let relative = Path::new(APP_DIR).join(FILE_NAME);
    match dirs::config_dir() {
        Some(base) => Ok(base.join(relative)),
        None => Err(ConfigError::Io {
            path: relative,
            source: io::Error::new(io::ErrorKind::NotFound, "no platform config directory"),
        }),
    }
}

/// Write the commented template to `path`, creating parent directories.
///
/// An existing file is left untouched.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_error = |source: io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "config already present; not overwriting");
            return Ok(());
        }
        Err(e) => return Err(io_error(e)),
    };
    file.write_all(default_config_toml().as_bytes())
        .map_err(io_error)?;

    info!(path = %path.display(), "wrote default config");
    Ok(())
}
