//! Settings persistence and change notification.
//!
//! The store owns the settings file and a `tokio::sync::watch` channel; the
//! daemon subscribes to the channel and forwards changes to the scheduler.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, info};

use super::Settings;

/// Settings file path relative to the home directory.
const DEFAULT_SETTINGS_PATH: &str = ".restmode/settings.json";

/// Loads, saves, and broadcasts [`Settings`].
pub struct SettingsStore {
    /// Path of the settings file
    path: PathBuf,
    /// Broadcast channel holding the current settings
    tx: watch::Sender<Settings>,
}

impl SettingsStore {
    /// Opens the store at the default path (`~/.restmode/settings.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be resolved, the file
    /// cannot be read, or its contents fail validation.
    pub fn open() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME環境変数が設定されていません")?;
        Self::open_at(PathBuf::from(home).join(DEFAULT_SETTINGS_PATH))
    }

    /// Opens the store at an explicit path.
    ///
    /// A missing file yields the defaults and writes them out so the user
    /// has a file to edit.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// validated.
    pub fn open_at(path: PathBuf) -> Result<Self> {
        let settings = if path.exists() {
            let settings = Self::read_file(&path)?;
            debug!("設定ファイルを読み込みました: {:?}", path);
            settings
        } else {
            let settings = Settings::default();
            Self::write_file(&path, &settings)
                .with_context(|| format!("初期設定ファイルを書き込めません: {:?}", path))?;
            info!("初期設定ファイルを作成しました: {:?}", path);
            settings
        };

        let (tx, _rx) = watch::channel(settings);
        Ok(Self { path, tx })
    }

    /// Returns a copy of the current settings.
    pub fn current(&self) -> Settings {
        self.tx.borrow().clone()
    }

    /// Returns a receiver that observes every settings change.
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    /// Re-reads the settings file, validates it, and broadcasts the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation; the
    /// previously broadcast settings stay in effect in that case.
    pub fn reload(&self) -> Result<Settings> {
        let settings = Self::read_file(&self.path)?;
        self.tx.send_replace(settings.clone());
        info!("設定を再読み込みしました");
        Ok(settings)
    }

    /// Persists and broadcasts the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the file write fails.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|message| anyhow::anyhow!("設定が不正です: {message}"))?;
        Self::write_file(&self.path, settings)?;
        self.tx.send_replace(settings.clone());
        Ok(())
    }

    /// Restores the default settings, persisting and broadcasting them.
    ///
    /// # Errors
    ///
    /// Returns an error if the file write fails.
    pub fn reset_to_defaults(&self) -> Result<Settings> {
        let settings = Settings::default();
        Self::write_file(&self.path, &settings)?;
        self.tx.send_replace(settings.clone());
        info!("設定を初期値に戻しました");
        Ok(settings)
    }

    /// Returns the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> Result<Settings> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("設定ファイルを読み込めません: {:?}", path))?;
        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("設定ファイルの形式が不正です: {:?}", path))?;
        settings
            .validate()
            .map_err(|message| anyhow::anyhow!("設定が不正です: {message}"))?;
        Ok(settings)
    }

    fn write_file(path: &Path, settings: &Settings) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("設定ディレクトリを作成できません: {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(settings).context("設定のシリアライズに失敗しました")?;
        fs::write(path, json).with_context(|| format!("設定ファイルを書き込めません: {:?}", path))?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_settings_path() -> PathBuf {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        // Keep the directory so it's not deleted
        std::mem::forget(dir);
        path
    }

    #[test]
    fn test_open_missing_file_writes_defaults() {
        let path = temp_settings_path();
        let store = SettingsStore::open_at(path.clone()).unwrap();

        assert!(path.exists());
        assert_eq!(store.current(), Settings::default());
    }

    #[test]
    fn test_open_existing_file() {
        let path = temp_settings_path();
        fs::write(&path, r#"{"workMinutes":45,"hideSkipButton":true}"#).unwrap();

        let store = SettingsStore::open_at(path).unwrap();
        let settings = store.current();
        assert_eq!(settings.work_minutes, 45);
        assert!(settings.hide_skip_button);
        // Unnamed fields fall back to defaults
        assert_eq!(settings.short_break_seconds, 30);
    }

    #[test]
    fn test_open_rejects_invalid_settings() {
        let path = temp_settings_path();
        fs::write(&path, r#"{"workMinutes":0}"#).unwrap();

        assert!(SettingsStore::open_at(path).is_err());
    }

    #[test]
    fn test_open_rejects_malformed_json() {
        let path = temp_settings_path();
        fs::write(&path, "not json").unwrap();

        assert!(SettingsStore::open_at(path).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_settings_path();
        let store = SettingsStore::open_at(path.clone()).unwrap();

        let changed = Settings {
            work_minutes: 30,
            ..Settings::default()
        };
        store.save(&changed).unwrap();

        // A second store sees the persisted value
        let reopened = SettingsStore::open_at(path).unwrap();
        assert_eq!(reopened.current().work_minutes, 30);
    }

    #[test]
    fn test_save_rejects_invalid() {
        let path = temp_settings_path();
        let store = SettingsStore::open_at(path).unwrap();

        let broken = Settings {
            long_break_interval: 0,
            ..Settings::default()
        };
        assert!(store.save(&broken).is_err());
        // The broadcast value is untouched
        assert_eq!(store.current(), Settings::default());
    }

    #[test]
    fn test_reload_broadcasts_to_subscriber() {
        let path = temp_settings_path();
        let store = SettingsStore::open_at(path.clone()).unwrap();
        let mut rx = store.subscribe();

        // Edit the file behind the store's back, then reload
        let edited = Settings {
            work_minutes: 90,
            ..Settings::default()
        };
        fs::write(&path, serde_json::to_string(&edited).unwrap()).unwrap();
        store.reload().unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().work_minutes, 90);
    }

    #[test]
    fn test_reload_invalid_keeps_previous() {
        let path = temp_settings_path();
        let store = SettingsStore::open_at(path.clone()).unwrap();

        fs::write(&path, r#"{"workMinutes":9999}"#).unwrap();
        assert!(store.reload().is_err());
        assert_eq!(store.current().work_minutes, 60);
    }

    #[test]
    fn test_reset_to_defaults() {
        let path = temp_settings_path();
        let store = SettingsStore::open_at(path).unwrap();

        store
            .save(&Settings {
                work_minutes: 25,
                ..Settings::default()
            })
            .unwrap();
        let restored = store.reset_to_defaults().unwrap();

        assert_eq!(restored, Settings::default());
        assert_eq!(store.current(), Settings::default());
    }
}
