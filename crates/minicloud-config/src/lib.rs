pub mod error;
pub mod settings;

pub use error::*;
pub use settings::{CloudDefaults, Settings, StoreSettings};

use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file directly
pub const CONFIG_ENV: &str = "MINICLOUD_CONFIG";

const CANDIDATES: [&str; 2] = ["minicloud.local.yaml", "minicloud.yaml"];

/// MiniCloud's directory under the user configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("minicloud"))
}

/// Look for a configuration file in `dir`, then in `dir/.minicloud/`
pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    let local = CANDIDATES.iter().map(|name| dir.join(name));
    let hidden = CANDIDATES.iter().map(|name| dir.join(".minicloud").join(name));
    local.chain(hidden).find(|path| path.is_file())
}

/// Find the configuration file
///
/// Search order:
/// 1. `MINICLOUD_CONFIG` (direct path)
/// 2. current directory: minicloud.local.yaml, minicloud.yaml
/// 3. `./.minicloud/`: same order
/// 4. `<config_dir>/minicloud/minicloud.yaml`
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!("{} points to missing file {}", CONFIG_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;
    if let Some(path) = find_config_file_in(&current_dir) {
        return Ok(Some(path));
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("minicloud.yaml");
        if global_config.is_file() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Read settings from a file, applying the environment on top
pub fn load_from(path: &Path) -> Result<Settings> {
    if !path.is_file() {
        return Err(ConfigError::ConfigFileNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    let mut settings = Settings::from_yaml(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    settings.store = settings.store.resolve(path.parent());
    settings.cloud.apply_env();
    settings.source = Some(path.to_path_buf());
    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load the settings from `path`, or from the discovered file
///
/// Without a file, defaults plus the environment are returned.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    if let Some(path) = path {
        return load_from(path);
    }
    match find_config_file()? {
        Some(path) => load_from(&path),
        None => {
            tracing::debug!("No configuration file, using defaults");
            let mut settings = Settings::default();
            settings.cloud.apply_env();
            Ok(settings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("minicloud"));
    }

    #[test]
    fn test_find_in_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(find_config_file_in(temp_dir.path()).is_none());

        fs::write(temp_dir.path().join("minicloud.yaml"), "").unwrap();
        let found = find_config_file_in(temp_dir.path()).unwrap();
        assert!(found.ends_with("minicloud.yaml"));
    }

    #[test]
    fn test_local_file_has_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("minicloud.yaml"), "").unwrap();
        fs::write(temp_dir.path().join("minicloud.local.yaml"), "").unwrap();

        let found = find_config_file_in(temp_dir.path()).unwrap();
        assert!(found.ends_with("minicloud.local.yaml"));
    }

    #[test]
    fn test_find_in_hidden_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let hidden = temp_dir.path().join(".minicloud");
        fs::create_dir(&hidden).unwrap();
        fs::write(hidden.join("minicloud.yaml"), "").unwrap();

        let found = find_config_file_in(temp_dir.path()).unwrap();
        assert!(found.ends_with(".minicloud/minicloud.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("minicloud.yaml"), "").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = temp_env::with_var_unset(CONFIG_ENV, find_config_file);
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().unwrap().ends_with("minicloud.yaml"));
    }

    #[test]
    #[serial]
    fn test_env_var_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "cloud:\n  name: custom\n").unwrap();

        let found = temp_env::with_var(CONFIG_ENV, Some(&config_path), find_config_file);
        assert_eq!(found.unwrap(), Some(config_path));
    }

    #[test]
    #[serial]
    fn test_load_applies_env_over_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("minicloud.yaml");
        fs::write(
            &config_path,
            "store:\n  type: file\n  path: state\ncloud:\n  name: lab\n  username: alice\n",
        )
        .unwrap();

        let settings = temp_env::with_vars(
            [
                ("OS_USERNAME", Some("bob")),
                ("OS_DEPLOYMENT_NAME", None),
            ],
            || load(Some(&config_path)),
        )
        .unwrap();

        assert_eq!(settings.cloud.name, "lab");
        assert_eq!(settings.cloud.username, "bob");
        assert_eq!(
            settings.store,
            StoreSettings::File {
                path: temp_dir.path().join("state")
            }
        );
        assert_eq!(settings.source, Some(config_path));
    }

    #[test]
    fn test_explicit_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = load(Some(&temp_dir.path().join("absent.yaml")));
        assert!(matches!(result, Err(ConfigError::ConfigFileNotFound(_))));
    }

    #[test]
    fn test_invalid_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("minicloud.yaml");
        fs::write(&config_path, "store: [1, 2").unwrap();
        assert!(matches!(
            load_from(&config_path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
