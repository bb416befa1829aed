use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::settings::Settings;
use crate::services::atomic::write_atomic;

/// Load settings from a JSON file; missing fields take their defaults.
pub fn load(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Err(Error::missing_input(path));
    }

    let data = fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&data)
        .map_err(|e| Error::invalid_settings(format!("{}: {e}", path.display())))?;

    validate(&settings)?;
    debug!("loaded settings from {}", path.display());
    Ok(settings)
}

pub fn load_or_default(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(p) => load(p),
        None => Ok(Settings::default()),
    }
}

pub fn save(path: &Path, settings: &Settings) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    write_atomic(path, json.as_bytes())?;
    Ok(())
}

pub fn validate(settings: &Settings) -> Result<()> {
    if settings.page_size == 0 {
        return Err(Error::invalid_settings("page_size must be at least 1"));
    }

    if settings.user_agent.trim().is_empty() {
        return Err(Error::invalid_settings("user_agent must not be empty"));
    }

    for pointer in settings
        .rules
        .word
        .iter()
        .chain(&settings.rules.translation)
        .chain(&settings.rules.audio)
    {
        if !pointer.is_empty() && !pointer.starts_with('/') {
            return Err(Error::invalid_settings(format!(
                "extraction rule '{pointer}' must be a JSON pointer starting with '/'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "page_size": 20, "emit_header": ["vietnamese", "english", "audio"],
                 "rules": { "word": ["/text"] } }"#,
        )
        .unwrap();

        let s = load(&path).unwrap();

        assert_eq!(s.page_size, 20);
        assert_eq!(s.emit_header[0], "vietnamese");
        assert_eq!(s.rules.word, vec!["/text"]);
        assert_eq!(s.rules.audio[0], "/lexeme/audio");
        assert_eq!(s.csv_download_attempts, 5);
        assert_eq!(s.api_download_attempts, 3);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        save(&path, &Settings::default()).unwrap();

        assert_eq!(load(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, r#"{ "page_size": 0 }"#).unwrap();
        assert!(matches!(load(&path), Err(Error::InvalidSettings { .. })));

        fs::write(&path, r#"{ "rules": { "audio": ["lexeme.audio"] } }"#).unwrap();
        assert!(matches!(load(&path), Err(Error::InvalidSettings { .. })));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(load(&path), Err(Error::InvalidSettings { .. })));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_or_default(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, Error::MissingInputFile { .. }));
        assert_eq!(load_or_default(None).unwrap(), Settings::default());
    }
}
