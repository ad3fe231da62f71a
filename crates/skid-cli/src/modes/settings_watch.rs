use std::path::PathBuf;

use skid_core::AgentSettings;

/// Re-reads the settings file and reports edits.
///
/// A file that is missing or fails to parse is ignored, so a half-written save
/// keeps the last good settings.
pub struct SettingsWatcher {
    path: PathBuf,
    current: AgentSettings,
}

impl SettingsWatcher {
    pub fn new(path: impl Into<PathBuf>, current: AgentSettings) -> Self {
        Self {
            path: path.into(),
            current,
        }
    }

    /// Returns the new settings if the file changed since the last poll.
    pub fn poll(&mut self) -> Option<&AgentSettings> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!("Failed to read {}: {}", self.path.display(), err);
                return None;
            }
        };
        let settings: AgentSettings = match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("Ignoring invalid settings in {}: {}", self.path.display(), err);
                return None;
            }
        };
        if settings == self.current {
            return None;
        }
        self.current = settings;
        Some(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_each_edit_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = AgentSettings::load_or_insert(&path).unwrap();
        let mut watcher = SettingsWatcher::new(&path, settings.clone());
        assert!(watcher.poll().is_none());

        let mut edited = settings;
        edited.policy.low_boost = 12.0;
        edited.store(&path).unwrap();
        assert_eq!(watcher.poll(), Some(&edited));
        assert!(watcher.poll().is_none());
    }

    #[test]
    fn test_invalid_file_keeps_last_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ \"policy\": ").unwrap();
        let mut watcher = SettingsWatcher::new(&path, AgentSettings::default());
        assert!(watcher.poll().is_none());

        std::fs::remove_file(&path).unwrap();
        assert!(watcher.poll().is_none());
    }
}
