use crate::error::Result;
use crate::model::entry::LexemeEntry;
use crate::model::settings::Settings;
use crate::parsers::curl;
use crate::services::{
    download::{DownloadConfig, Downloader},
    download_types::DownloadReport,
    emit, encoding, extract,
    fetch::{self, FetchConfig},
    http::{Pause, Transport},
    qa, tabular,
};

use serde::Serialize;
use tracing::{debug, info, warn};

use std::path::Path;
use std::time::Duration;

const SAMPLE_ENTRIES: usize = 3;

#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub records: usize,
    pub qa_issues: usize,
    pub download: Option<DownloadReport>,
    /// Rows written to the import file; 0 when nothing was fetched.
    pub written: usize,
}

#[derive(Debug, Serialize)]
pub struct CsvDownloadReport {
    pub rows: usize,
    /// Data rows whose link cell was missing or blank
    pub without_link: usize,
    pub download: DownloadReport,
}

fn download_config(settings: &Settings, max_attempts: u32, audio_dir: &Path) -> DownloadConfig {
    DownloadConfig {
        audio_dir: audio_dir.to_path_buf(),
        user_agent: settings.user_agent.clone(),
        max_attempts,
        batch_pause_every: settings.batch_pause_every,
        batch_pause: Duration::from_millis(settings.batch_pause_ms),
    }
}

fn log_sample(entries: &[LexemeEntry]) {
    for (i, e) in entries.iter().take(SAMPLE_ENTRIES).enumerate() {
        info!(
            "  {}. {} = {} (audio: {})",
            i + 1,
            e.word,
            e.translation,
            e.audio_url.as_deref().unwrap_or("none")
        );
    }
}

/// Capture → fetch → extract → download → import CSV.
pub fn run(
    settings: &Settings,
    transport: &dyn Transport,
    pause: &dyn Pause,
) -> Result<PipelineReport> {
    let capture = encoding::read_text(&settings.capture_file)?;
    let template = curl::parse(&capture)?;

    info!(
        user_id = template.user_id.as_deref().unwrap_or("?"),
        learning = template.learning_language.as_deref().unwrap_or("?"),
        from = template.from_language.as_deref().unwrap_or("?"),
        headers = template.headers.len(),
        body = template.body.is_some(),
        "Parsed captured request"
    );

    let fetch_cfg = FetchConfig {
        page_size: settings.page_size,
        page_pause: Duration::from_millis(settings.page_pause_ms),
    };
    let records = fetch::fetch_all(transport, pause, &template, &fetch_cfg)?;

    if records.is_empty() {
        warn!(
            "No lexemes found. The API might have changed or authentication may have failed; \
             check that the bearer token and cookies in {} are current",
            settings.capture_file.display()
        );
        return Ok(PipelineReport {
            records: 0,
            qa_issues: 0,
            download: None,
            written: 0,
        });
    }

    let entries = extract::extract_all(&records, &settings.rules);
    let with_audio = entries.iter().filter(|e| e.has_audio()).count();
    info!("Extracted {} entries ({} with audio)", entries.len(), with_audio);
    log_sample(&entries);

    let issues = qa::run(&entries);
    for issue in &issues {
        debug!("entry {}: {} ({})", issue.index, issue.code, issue.message);
    }
    if !issues.is_empty() {
        warn!("{} entry issues found (run with -v to list them)", issues.len());
    }

    let mut downloader = Downloader::new(
        transport,
        pause,
        download_config(settings, settings.api_download_attempts, &settings.audio_dir),
    );
    let (cache, download) =
        downloader.download_all(entries.iter().filter_map(|e| e.audio_url.as_deref()))?;

    info!("{} audio files available locally", cache.len());

    let written = emit::write_import_csv(
        &settings.output_csv,
        &settings.emit_header,
        &entries,
        &cache,
    )?;

    Ok(PipelineReport {
        records: records.len(),
        qa_issues: issues.len(),
        download: Some(download),
        written,
    })
}

/// Download every link in `column` of an exported vocabulary CSV.
pub fn run_csv_download(
    settings: &Settings,
    input: &Path,
    column: &str,
    audio_dir: &Path,
    transport: &dyn Transport,
    pause: &dyn Pause,
) -> Result<CsvDownloadReport> {
    let cells = tabular::column_cells(input, column)?;
    info!("Found {} data rows in {}", cells.len(), input.display());

    let mut without_link = 0usize;
    let mut urls: Vec<&str> = Vec::with_capacity(cells.len());
    for cell in &cells {
        if cell.value.is_empty() {
            info!("Row {}: no audio link, skipping", cell.row_number);
            without_link += 1;
        } else {
            urls.push(&cell.value);
        }
    }

    let mut downloader = Downloader::new(
        transport,
        pause,
        download_config(settings, settings.csv_download_attempts, audio_dir),
    );
    let (_, download) = downloader.download_all(urls)?;

    Ok(CsvDownloadReport {
        rows: cells.len(),
        without_link,
        download,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::services::http::testing::{RecordingPause, ScriptedTransport};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn settings(dir: &Path) -> Settings {
        Settings {
            capture_file: dir.join("curl.txt"),
            output_csv: dir.join("final.csv"),
            audio_dir: dir.join("audio_files"),
            page_size: 2,
            ..Settings::default()
        }
    }

    fn write_capture(dir: &Path) {
        fs::write(
            dir.join("curl.txt"),
            "curl 'https://www.duolingo.com/2017-06-30/users/7/courses/vi/en/learned-lexemes?limit=50' \
             -H 'authorization: Bearer t' --data-raw '{}'",
        )
        .unwrap();
    }

    #[test]
    fn test_full_run_writes_import_file() {
        let dir = tempdir().unwrap();
        write_capture(dir.path());

        let page1 = json!({ "lexemes": [
            { "lexeme": { "word": "xin chào", "translation": "hello", "audio": "https://cdn/a/hello" } },
            { "word": "nước", "translations": ["water"], "tts": "https://cdn/a/water" }
        ]});
        let page2 = json!({ "lexemes": [ { "word": "cảm ơn", "translation": "thanks" } ] });

        let transport = ScriptedTransport::new()
            .respond(200, &serde_json::to_vec(&page1).unwrap())
            .respond(200, &serde_json::to_vec(&page2).unwrap())
            .respond(200, b"mp3-hello")
            .respond(404, b"");
        let pause = RecordingPause::default();

        let report = run(&settings(dir.path()), &transport, &pause).unwrap();

        assert_eq!(report.records, 3);
        assert_eq!(report.written, 3);
        assert_eq!(report.qa_issues, 1);
        let download = report.download.unwrap();
        assert_eq!(download.downloaded, 1);
        assert_eq!(download.failed, 1);
        assert_eq!(transport.calls(), 4);

        assert!(dir.path().join("audio_files").join("hello.mp3").exists());
        let csv = fs::read_to_string(dir.path().join("final.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "word,translation,audio");
        assert_eq!(lines[1], "xin chào,hello,[sound:hello.mp3]");
        assert_eq!(lines[2], "nước,water,");
        assert_eq!(lines[3], "cảm ơn,thanks,");
    }

    #[test]
    fn test_empty_fetch_writes_nothing() {
        let dir = tempdir().unwrap();
        write_capture(dir.path());
        let transport = ScriptedTransport::new().respond(200, b"{\"lexemes\": []}");
        let pause = RecordingPause::default();

        let report = run(&settings(dir.path()), &transport, &pause).unwrap();

        assert_eq!(report.records, 0);
        assert!(report.download.is_none());
        assert!(!dir.path().join("final.csv").exists());
    }

    #[test]
    fn test_missing_capture_aborts_before_network() {
        let dir = tempdir().unwrap();
        let transport = ScriptedTransport::new();
        let pause = RecordingPause::default();

        let err = run(&settings(dir.path()), &transport, &pause).unwrap_err();

        assert!(matches!(err, Error::MissingInputFile { .. }));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_csv_download_skips_blank_links() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("with_links.csv");
        fs::write(
            &input,
            "vietnamese,english,audio_file_link\nxin chào,hello,https://cdn/a/one\nnước,water,\n",
        )
        .unwrap();
        let transport = ScriptedTransport::new().respond(200, b"1");
        let pause = RecordingPause::default();
        let audio_dir = dir.path().join("audio_files");

        let report = run_csv_download(
            &settings(dir.path()),
            &input,
            "audio_file_link",
            &audio_dir,
            &transport,
            &pause,
        )
        .unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.without_link, 1);
        assert_eq!(report.download.downloaded, 1);
        assert!(audio_dir.join("one.mp3").exists());
    }
}
