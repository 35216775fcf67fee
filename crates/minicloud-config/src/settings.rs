use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where cloud and cluster declarations are kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreSettings {
    /// Nothing survives the process
    #[default]
    Memory,
    /// One JSON file per table under `path`
    File { path: PathBuf },
}

impl StoreSettings {
    pub fn is_persistent(&self) -> bool {
        matches!(self, StoreSettings::File { .. })
    }

    /// Expand a leading `~` and anchor relative paths at `base`
    pub(crate) fn resolve(self, base: Option<&Path>) -> Self {
        match self {
            StoreSettings::File { path } => {
                let path = match path.strip_prefix("~") {
                    Ok(rest) => dirs::home_dir()
                        .map(|home| home.join(rest))
                        .unwrap_or_else(|| path.clone()),
                    Err(_) => path,
                };
                let path = match base {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path,
                };
                StoreSettings::File { path }
            }
            memory => memory,
        }
    }
}

/// Settings for the cloud created by `configure`
///
/// Values come from the configuration file, and the `OS_*` environment
/// variables override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudDefaults {
    pub name: String,
    #[serde(rename = "type")]
    pub cloud_type: String,
    pub version: String,
    pub location: String,
    pub auth_url: String,
    pub tenant: String,
    pub username: String,
    pub password: String,
    pub user_domain_id: String,
    pub project_domain_id: String,
}

impl Default for CloudDefaults {
    fn default() -> Self {
        Self {
            name: "DevStack".to_string(),
            cloud_type: "OpenStack".to_string(),
            version: "master".to_string(),
            location: "localhost".to_string(),
            auth_url: "http://localhost/identity".to_string(),
            tenant: "admin".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            user_domain_id: "default".to_string(),
            project_domain_id: "default".to_string(),
        }
    }
}

impl CloudDefaults {
    /// Apply the `OS_*` variables of the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |field: &mut String, keys: &[&str]| {
            if let Some(value) = keys.iter().find_map(|key| lookup(key)) {
                tracing::debug!("cloud setting from {}", keys[0]);
                *field = value;
            }
        };
        set(&mut self.name, &["OS_DEPLOYMENT_NAME"]);
        set(&mut self.cloud_type, &["OS_DEPLOYMENT_TYPE"]);
        set(&mut self.version, &["OS_DEPLOYMENT_VERSION"]);
        set(&mut self.location, &["OS_DEPLOYMENT_LOCATION"]);
        set(&mut self.auth_url, &["OS_AUTH_URL"]);
        set(&mut self.tenant, &["OS_PROJECT_NAME", "OS_TENANT_NAME"]);
        set(&mut self.username, &["OS_USERNAME"]);
        set(&mut self.password, &["OS_PASSWORD"]);
        set(&mut self.user_domain_id, &["OS_USER_DOMAIN_ID"]);
        set(&mut self.project_domain_id, &["OS_PROJECT_DOMAIN_ID"]);
    }
}

/// Contents of `minicloud.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreSettings,
    pub cloud: CloudDefaults,
    pub show_unnamed_clusters: bool,
    /// File the settings were read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Settings {
    pub fn from_yaml(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.store, StoreSettings::Memory);
        assert_eq!(settings.cloud.name, "DevStack");
        assert_eq!(settings.cloud.cloud_type, "OpenStack");
        assert_eq!(settings.cloud.auth_url, "http://localhost/identity");
        assert!(!settings.show_unnamed_clusters);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = Settings::from_yaml(
            r#"
store:
  type: file
  path: /var/lib/minicloud
cloud:
  name: lab
show_unnamed_clusters: true
"#,
        )
        .unwrap();
        assert_eq!(
            settings.store,
            StoreSettings::File {
                path: PathBuf::from("/var/lib/minicloud")
            }
        );
        assert_eq!(settings.cloud.name, "lab");
        assert_eq!(settings.cloud.username, "admin");
        assert!(settings.show_unnamed_clusters);
    }

    #[test]
    fn test_empty_yaml() {
        assert_eq!(Settings::from_yaml("\n").unwrap(), Settings::default());
    }

    #[test]
    fn test_unknown_store_type() {
        assert!(Settings::from_yaml("store:\n  type: postgres\n").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OS_DEPLOYMENT_NAME", "prod"),
            ("OS_TENANT_NAME", "demo"),
            ("OS_PASSWORD", "secret"),
        ]
        .into_iter()
        .collect();

        let mut cloud = CloudDefaults::default();
        cloud.apply_env_with(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(cloud.name, "prod");
        assert_eq!(cloud.tenant, "demo");
        assert_eq!(cloud.password, "secret");
        assert_eq!(cloud.location, "localhost");
    }

    #[test]
    fn test_project_name_wins_over_tenant_name() {
        let mut cloud = CloudDefaults::default();
        cloud.apply_env_with(|key| match key {
            "OS_PROJECT_NAME" => Some("project".to_string()),
            "OS_TENANT_NAME" => Some("tenant".to_string()),
            _ => None,
        });
        assert_eq!(cloud.tenant, "project");
    }

    #[test]
    fn test_relative_store_path_is_anchored() {
        let store = StoreSettings::File {
            path: PathBuf::from("state"),
        }
        .resolve(Some(Path::new("/etc/minicloud")));
        assert_eq!(
            store,
            StoreSettings::File {
                path: PathBuf::from("/etc/minicloud/state")
            }
        );
        assert!(store.is_persistent());
        assert_eq!(StoreSettings::Memory.resolve(None), StoreSettings::Memory);
    }
}
