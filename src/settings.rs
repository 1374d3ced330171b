use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::login::LoginMethod;
use crate::version::{VersionCatalog, DEFAULT_CATALOG, DEFAULT_VERSION, MANIFEST_URL};
use crate::{Error, Result};

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ezmc-launcher")
}

pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ezmc-launcher")
        .join("settings.toml")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub auth: AuthSettings,
    pub versions: VersionSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub default_login_method: LoginMethod,
    pub avatars_directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub simulated_delay_ms: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionSettings {
    pub default_version: String,
    pub catalog: Vec<String>,
    pub fetch_manifest: bool,
    pub manifest_url: String,
    pub manifest_limit: usize,
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub tick_rate_ms: u64,
    pub success_status_secs: u64,
    pub error_status_secs: u64,
    pub left_panel_percent: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub save_to_file: bool,
    pub directory: PathBuf,
    pub retention_hours: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            auth: AuthSettings::default(),
            versions: VersionSettings::default(),
            ui: UiSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            default_login_method: LoginMethod::Official,
            avatars_directory: data_dir().join("resources"),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            simulated_delay_ms: 1500,
            timeout_secs: 30,
        }
    }
}

impl Default for VersionSettings {
    fn default() -> Self {
        Self {
            default_version: DEFAULT_VERSION.to_string(),
            catalog: DEFAULT_CATALOG.iter().map(|v| v.to_string()).collect(),
            fetch_manifest: false,
            manifest_url: MANIFEST_URL.to_string(),
            manifest_limit: 20,
            fetch_timeout_secs: 10,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            success_status_secs: 3,
            error_status_secs: 5,
            left_panel_percent: 20,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            save_to_file: true,
            directory: data_dir().join("logs"),
            retention_hours: 24,
        }
    }
}

impl Settings {
    pub fn auth_delay(&self) -> Duration {
        Duration::from_millis(self.auth.simulated_delay_ms)
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth.timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.versions.fetch_timeout_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms)
    }

    pub fn catalog(&self) -> Result<VersionCatalog> {
        VersionCatalog::new(self.versions.catalog.clone())
    }

    pub fn validate(&self) -> Result<()> {
        let catalog = self.catalog()?;
        if !catalog.contains(&self.versions.default_version) {
            return Err(Error::Settings(format!(
                "Default version {} is not in the catalog",
                self.versions.default_version
            )));
        }

        if self.auth.timeout_secs == 0 {
            return Err(Error::Settings("Auth timeout cannot be 0".to_string()));
        }

        if self.ui.tick_rate_ms == 0 {
            return Err(Error::Settings("Tick rate cannot be 0".to_string()));
        }

        if !(10..=60).contains(&self.ui.left_panel_percent) {
            return Err(Error::Settings(
                "Left panel width must be between 10 and 60 percent".to_string(),
            ));
        }

        if self.versions.fetch_manifest && self.versions.manifest_limit == 0 {
            return Err(Error::Settings("Manifest limit cannot be 0".to_string()));
        }

        if self.versions.fetch_manifest && self.versions.fetch_timeout_secs == 0 {
            return Err(Error::Settings("Manifest fetch timeout cannot be 0".to_string()));
        }

        Ok(())
    }
}

pub struct SettingsManager {
    settings: Settings,
    settings_path: PathBuf,
    dirty: bool,
}

impl SettingsManager {
    /// Loads settings from `settings_path`, writing defaults there first if
    /// the file does not exist yet.
    pub fn new(settings_path: PathBuf) -> Result<Self> {
        let mut manager = Self {
            settings: Settings::default(),
            settings_path,
            dirty: false,
        };

        manager.load()?;
        Ok(manager)
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        self.dirty = true;
        &mut self.settings
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&self.settings)?;
        std::fs::write(&self.settings_path, content)?;
        self.dirty = false;

        log::info!("Settings saved to {:?}", self.settings_path);
        Ok(())
    }

    pub fn load(&mut self) -> Result<()> {
        if !self.settings_path.exists() {
            self.dirty = true;
            return self.save();
        }

        let content = std::fs::read_to_string(&self.settings_path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;

        self.settings = settings;
        self.dirty = false;
        log::info!("Settings loaded from {:?}", self.settings_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.auth_delay(), Duration::from_millis(1500));
        assert_eq!(settings.catalog().unwrap(), VersionCatalog::default());
    }

    #[test]
    fn default_version_outside_catalog_is_rejected() {
        let mut settings = Settings::default();
        settings.versions.default_version = "1.8.9".to_string();
        assert!(matches!(settings.validate(), Err(Error::Settings(_))));
    }

    #[test]
    fn fetch_timeout_is_separate_from_auth_timeout() {
        let mut settings: Settings = toml::from_str(
            r#"
            [auth]
            timeout_secs = 45

            [versions]
            fetch_manifest = true
            fetch_timeout_secs = 4
            "#,
        )
        .unwrap();
        assert_eq!(settings.auth_timeout(), Duration::from_secs(45));
        assert_eq!(settings.fetch_timeout(), Duration::from_secs(4));
        settings.validate().unwrap();

        settings.versions.fetch_timeout_secs = 0;
        assert!(matches!(settings.validate(), Err(Error::Settings(_))));
        assert_eq!(Settings::default().fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn manager_creates_then_reloads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let mut manager = SettingsManager::new(path.clone()).unwrap();
        assert!(path.exists());
        assert!(!manager.is_dirty());

        manager.get_mut().versions.default_version = "1.18.1".to_string();
        manager.get_mut().general.default_login_method = LoginMethod::Offline;
        manager.save().unwrap();

        let reloaded = SettingsManager::new(path).unwrap();
        assert_eq!(reloaded.get().versions.default_version, "1.18.1");
        assert_eq!(
            reloaded.get().general.default_login_method,
            LoginMethod::Offline
        );
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[auth]\ntimeout_secs = 10\n").unwrap();

        let manager = SettingsManager::new(path).unwrap();
        assert_eq!(manager.get().auth.timeout_secs, 10);
        assert_eq!(manager.get().auth.simulated_delay_ms, 1500);
        assert_eq!(manager.get().versions.default_version, DEFAULT_VERSION);
    }

    #[test]
    fn broken_file_reports_toml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[versions\n").unwrap();

        assert!(matches!(
            SettingsManager::new(path),
            Err(Error::Toml(_))
        ));
    }
}
