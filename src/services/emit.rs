use crate::error::Result;
use crate::model::entry::LexemeEntry;
use crate::services::download_types::DownloadCache;
use crate::services::media::sound_reference;
use crate::services::tabular::open_writer;

use tracing::info;

use std::path::Path;

/// Audio cell for one entry: a playback reference when its file is cached.
pub fn audio_cell(entry: &LexemeEntry, cache: &DownloadCache) -> String {
    entry
        .audio_url
        .as_deref()
        .and_then(|url| cache.filename(url))
        .map(sound_reference)
        .unwrap_or_default()
}

/// Write the flashcard import file, replacing any previous one.
pub fn write_import_csv(
    output: &Path,
    header: &[String; 3],
    entries: &[LexemeEntry],
    cache: &DownloadCache,
) -> Result<usize> {
    let mut writer = open_writer(output)?;
    writer.write_record(header)?;

    for e in entries {
        writer.write_record([
            e.word.as_str(),
            e.translation.as_str(),
            audio_cell(e, cache).as_str(),
        ])?;
    }

    writer.flush()?;
    info!("Created {} with {} entries", output.display(), entries.len());

    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_only_cached_audio_is_referenced() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("final.csv");

        let mut cache = DownloadCache::new();
        cache.insert("https://a/abc123", "abc123.mp3");

        let entries = vec![
            LexemeEntry::new("xin chào", "hello", Some("https://a/abc123".to_string())),
            LexemeEntry::new("nước", "water", Some("https://a/failed".to_string())),
            LexemeEntry::new("cảm ơn", "thank you, thanks", None),
        ];
        let header = [
            "vietnamese".to_string(),
            "english".to_string(),
            "audio".to_string(),
        ];

        let n = write_import_csv(&output, &header, &entries, &cache).unwrap();

        assert_eq!(n, 3);
        let text = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "vietnamese,english,audio",
                "xin chào,hello,[sound:abc123.mp3]",
                "nước,water,",
                "cảm ơn,\"thank you, thanks\",",
            ]
        );
    }
}
