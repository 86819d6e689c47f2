use std::path::PathBuf;

use wormi_hub_core::{Error, Result, preferences::Preferences};

const PREFERENCES_FILE: &str = "preferences.json";

/// Theme preference on disk
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            path: config_dir.join(PREFERENCES_FILE),
        }
    }

    pub fn with_default_dir(app_name: &str) -> Result<Self> {
        let config_dir = Self::get_default_config_dir(app_name)?;
        Ok(Self::new(config_dir))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn get_default_config_dir(app_name: &str) -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(home) = std::env::var_os("HOME") {
                Ok(PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join(app_name))
            } else {
                Err(Error::Config(
                    "Cannot determine config directory".to_string(),
                ))
            }
        }

        #[cfg(target_os = "linux")]
        {
            if let Some(config_dir) = std::env::var_os("XDG_CONFIG_HOME") {
                Ok(PathBuf::from(config_dir).join(app_name))
            } else if let Some(home) = std::env::var_os("HOME") {
                Ok(PathBuf::from(home).join(".config").join(app_name))
            } else {
                Err(Error::Config(
                    "Cannot determine config directory".to_string(),
                ))
            }
        }

        #[cfg(target_os = "windows")]
        {
            if let Some(app_data) = std::env::var_os("APPDATA") {
                Ok(PathBuf::from(app_data).join(app_name))
            } else {
                Err(Error::Config(
                    "Cannot determine config directory".to_string(),
                ))
            }
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            Err(Error::Config(
                "Unsupported operating system for config directory detection".to_string(),
            ))
        }
    }

    /// Missing or unreadable preferences fall back to the defaults
    pub async fn load(&self) -> Preferences {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                }
                return Preferences::default();
            }
        };

        serde_json::from_slice(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring corrupt preferences {}: {}", self.path.display(), e);
            Preferences::default()
        })
    }

    pub async fn save(&self, preferences: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = serde_json::to_vec_pretty(preferences)?;
        tokio::fs::write(&self.path, content).await?;
        tracing::debug!("preferences saved to {}", self.path.display());
        Ok(())
    }
}
