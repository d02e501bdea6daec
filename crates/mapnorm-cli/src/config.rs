//! Locating and reading `config.toml` for a run.
//!
//! An explicit `--config` path must exist. Otherwise the first file found
//! among [`LOCAL_CONFIG`] and the per-user config directory is used, and a
//! run without any file falls back to [`AppConfig::default`].

use std::{fs, path::PathBuf};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use mapnorm::{MapError, config::AppConfig};

/// Config file looked up relative to the working directory.
pub const LOCAL_CONFIG: &str = "mapnorm/config.toml";

/// Errors raised while reading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for MapError {
    fn from(err: ConfigError) -> Self {
        MapError::Config(err.to_string())
    }
}

/// Implicit config locations, most specific first.
fn candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
    match ProjectDirs::from("com", "mapnorm", "mapnorm") {
        Some(dirs) => paths.push(dirs.config_dir().join("config.toml")),
        None => debug!("No per-user config directory on this platform"),
    }
    paths
}

/// Loads the map processing configuration.
///
/// # Errors
///
/// Fails when `explicit_path` names a missing file, or when the chosen file
/// is not a valid configuration.
pub fn load_config(explicit_path: Option<impl Into<PathBuf>>) -> Result<AppConfig, MapError> {
    let path = match explicit_path {
        Some(path) => path.into(),
        None => match candidates().into_iter().find(|path| path.is_file()) {
            Some(path) => path,
            None => {
                debug!("No config file found, using defaults");
                return Ok(AppConfig::default());
            }
        },
    };

    info!(path = path.display().to_string(); "Reading configuration");
    read_config(path)
}

fn read_config(path: PathBuf) -> Result<AppConfig, MapError> {
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::MissingFile(path).into());
        }
        Err(err) => return Err(err.into()),
    };

    toml::from_str(&content).map_err(|err| {
        ConfigError::Parse {
            path,
            message: err.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use mapnorm::geometry::ViewportPolicy;

    use super::*;

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[markers]
vocabulary = ["area", "stairs"]

[geometry]
unit = 2.5
viewport = { policy = "padded", margin = 0.5 }

[preview]
template = "templates/map.html"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert!(config.markers().vocabulary().contains("stairs"));
        assert!(!config.markers().vocabulary().contains("door"));
        assert_eq!(config.geometry().unit(), 2.5);
        assert_eq!(
            config.geometry().viewport(),
            ViewportPolicy::Padded { margin: 0.5 }
        );
        assert_eq!(
            config.preview().template(),
            Some(Path::new("templates/map.html"))
        );
        assert_eq!(config.preview().stylesheet(), None);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[geometry]\nviewport = { policy = \"fixed\" }\n").unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.geometry().unit(), 1.0);
        assert_eq!(
            config.geometry().viewport(),
            ViewportPolicy::Fixed { size: 1000.0 }
        );
        assert!(config.markers().vocabulary().contains("transition-view"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = load_config(Some(&path)).unwrap_err();

        assert!(matches!(err, MapError::Config(message) if message.starts_with("Missing configuration file")));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[geometry\nunit = ").unwrap();

        let err = load_config(Some(&path)).unwrap_err();

        assert!(matches!(err, MapError::Config(_)));
    }
}
