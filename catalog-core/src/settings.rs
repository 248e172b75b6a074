//! UI preference store
//!
//! Holds the process-wide display preferences (currently the colour theme).
//! Preferences are loaded once at startup and written back on every change.
//! The query engine never reads them.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(SettingsError::UnknownTheme(other.to_string())),
        }
    }
}

/// Persisted display preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
}

/// Backing storage for preferences
pub trait PreferenceStore: Send + Sync {
    /// Load saved preferences, `None` when nothing was saved yet
    fn load(&self) -> Result<Option<Preferences>, SettingsError>;

    /// Persist preferences
    fn save(&self, preferences: &Preferences) -> Result<(), SettingsError>;
}

/// In-memory store, mainly for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<Preferences>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: Preferences) -> Self {
        Self {
            saved: Mutex::new(Some(preferences)),
        }
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Result<Option<Preferences>, SettingsError> {
        Ok(*self.saved.lock())
    }

    fn save(&self, preferences: &Preferences) -> Result<(), SettingsError> {
        *self.saved.lock() = Some(*preferences);
        Ok(())
    }
}

/// TOML file store
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for TomlFileStore {
    fn load(&self) -> Result<Option<Preferences>, SettingsError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let preferences = toml::from_str(&content)?;
        Ok(Some(preferences))
    }

    fn save(&self, preferences: &Preferences) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(preferences)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Preference change event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceChange {
    pub old: Preferences,
    pub new: Preferences,
}

/// Settings manager
pub struct SettingsManager {
    preferences: RwLock<Preferences>,
    store: Box<dyn PreferenceStore>,
    change_tx: broadcast::Sender<PreferenceChange>,
}

impl SettingsManager {
    /// Load preferences from the store
    ///
    /// A saved theme wins; otherwise the system preference decides. An
    /// unreadable store is logged and treated as empty.
    pub fn init(store: Box<dyn PreferenceStore>, system_prefers_dark: bool) -> Self {
        let saved = match store.load() {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Failed to load preferences, using defaults: {}", e);
                None
            }
        };

        let preferences = saved.unwrap_or(Preferences {
            theme: if system_prefers_dark { Theme::Dark } else { Theme::Light },
        });

        debug!(theme = %preferences.theme, saved = saved.is_some(), "Preferences loaded");

        let (change_tx, _) = broadcast::channel(16);

        Self {
            preferences: RwLock::new(preferences),
            store,
            change_tx,
        }
    }

    /// Current preferences
    pub fn preferences(&self) -> Preferences {
        *self.preferences.read()
    }

    pub fn theme(&self) -> Theme {
        self.preferences.read().theme
    }

    /// Set and persist the theme
    pub fn set_theme(&self, theme: Theme) -> Result<Theme, SettingsError> {
        self.update(|prefs| prefs.theme = theme)?;
        Ok(theme)
    }

    /// Flip the theme and persist it
    pub fn toggle_theme(&self) -> Result<Theme, SettingsError> {
        let mut theme = Theme::default();
        self.update(|prefs| {
            prefs.theme = prefs.theme.toggled();
            theme = prefs.theme;
        })?;
        Ok(theme)
    }

    /// Subscribe to preference changes
    pub fn subscribe_changes(&self) -> broadcast::Receiver<PreferenceChange> {
        self.change_tx.subscribe()
    }

    // Memory is only updated once the store accepted the new value
    fn update<F>(&self, updater: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&mut Preferences),
    {
        let mut current = self.preferences.write();
        let old = *current;
        let mut new = old;
        updater(&mut new);

        self.store.save(&new)?;
        *current = new;
        drop(current);

        info!(theme = %new.theme, "Preferences updated");

        // No receivers is fine
        let _ = self.change_tx.send(PreferenceChange { old, new });

        Ok(())
    }
}

/// Preference errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("Preference file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse preferences: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FailingStore;

    impl PreferenceStore for FailingStore {
        fn load(&self) -> Result<Option<Preferences>, SettingsError> {
            Err(SettingsError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )))
        }

        fn save(&self, _preferences: &Preferences) -> Result<(), SettingsError> {
            Err(SettingsError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )))
        }
    }

    #[test]
    fn test_system_preference_used_when_nothing_saved() {
        let manager = SettingsManager::init(Box::new(MemoryStore::new()), true);
        assert_eq!(manager.theme(), Theme::Dark);

        let manager = SettingsManager::init(Box::new(MemoryStore::new()), false);
        assert_eq!(manager.theme(), Theme::Light);
    }

    #[test]
    fn test_saved_theme_wins_over_system() {
        let store = MemoryStore::with_preferences(Preferences { theme: Theme::Light });
        let manager = SettingsManager::init(Box::new(store), true);
        assert_eq!(manager.theme(), Theme::Light);
    }

    #[test]
    fn test_toggle_persists_and_broadcasts() {
        let manager = SettingsManager::init(Box::new(MemoryStore::new()), false);
        let mut rx = manager.subscribe_changes();

        assert_eq!(manager.toggle_theme().unwrap(), Theme::Dark);

        let change = rx.try_recv().unwrap();
        assert_eq!(change.old.theme, Theme::Light);
        assert_eq!(change.new.theme, Theme::Dark);
    }

    #[test]
    fn test_failed_save_leaves_state_untouched() {
        let manager = SettingsManager::init(Box::new(FailingStore), true);
        assert_eq!(manager.theme(), Theme::Dark);

        assert!(manager.set_theme(Theme::Light).is_err());
        assert_eq!(manager.theme(), Theme::Dark);
    }

    #[test]
    fn test_toml_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs").join("preferences.toml");

        let store = TomlFileStore::new(&path);
        assert!(store.load().unwrap().is_none());

        let manager = SettingsManager::init(Box::new(store), false);
        manager.set_theme(Theme::Dark).unwrap();
        assert!(path.exists());

        // A fresh manager sees the persisted value regardless of system preference
        let reloaded = SettingsManager::init(Box::new(TomlFileStore::new(&path)), false);
        assert_eq!(reloaded.theme(), Theme::Dark);
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("preferences.toml");
        std::fs::write(&path, "theme = \"sepia\"").unwrap();

        assert!(TomlFileStore::new(&path).load().is_err());

        let manager = SettingsManager::init(Box::new(TomlFileStore::new(&path)), true);
        assert_eq!(manager.theme(), Theme::Dark);
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!(matches!("sepia".parse::<Theme>(), Err(SettingsError::UnknownTheme(_))));
    }
}
