use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub const AUDIO_LINK_COLUMN: &str = "audio_file_link";

fn default_capture_file() -> PathBuf {
    PathBuf::from("curl.txt")
}

fn default_output_csv() -> PathBuf {
    PathBuf::from("duolingo_vocabulary_final.csv")
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("audio_files")
}

fn default_page_size() -> usize {
    50
}

fn default_page_pause_ms() -> u64 {
    500
}

fn default_api_download_attempts() -> u32 {
    3
}

fn default_csv_download_attempts() -> u32 {
    5
}

fn default_batch_pause_every() -> usize {
    10
}

fn default_batch_pause_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_emit_header() -> [String; 3] {
    [
        "word".to_string(),
        "translation".to_string(),
        "audio".to_string(),
    ]
}

fn default_link_column() -> String {
    AUDIO_LINK_COLUMN.to_string()
}

fn pointers(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_word_rules() -> Vec<String> {
    pointers(&["/lexeme/word", "/word", "/learningWord"])
}

fn default_translation_rules() -> Vec<String> {
    pointers(&["/lexeme/translation", "/translation", "/translations/0"])
}

fn default_audio_rules() -> Vec<String> {
    pointers(&["/lexeme/audio", "/audio", "/tts", "/lexeme/tts"])
}

/// Field lookup chains, each an ordered list of JSON pointers.
///
/// The remote schema is undocumented, so these are guesses meant to be
/// edited in the settings file when the service changes shape.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExtractionRules {
    #[serde(default = "default_word_rules")]
    pub word: Vec<String>,

    #[serde(default = "default_translation_rules")]
    pub translation: Vec<String>,

    #[serde(default = "default_audio_rules")]
    pub audio: Vec<String>,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            word: default_word_rules(),
            translation: default_translation_rules(),
            audio: default_audio_rules(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_capture_file")]
    pub capture_file: PathBuf,

    #[serde(default = "default_output_csv")]
    pub output_csv: PathBuf,

    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_page_pause_ms")]
    pub page_pause_ms: u64,

    #[serde(default = "default_api_download_attempts")]
    pub api_download_attempts: u32,

    #[serde(default = "default_csv_download_attempts")]
    pub csv_download_attempts: u32,

    /// Pause after every Nth item that went to the network (0 disables).
    #[serde(default = "default_batch_pause_every")]
    pub batch_pause_every: usize,

    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_emit_header")]
    pub emit_header: [String; 3],

    #[serde(default = "default_link_column")]
    pub link_column: String,

    #[serde(default)]
    pub rules: ExtractionRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            capture_file: default_capture_file(),
            output_csv: default_output_csv(),
            audio_dir: default_audio_dir(),
            page_size: default_page_size(),
            page_pause_ms: default_page_pause_ms(),
            api_download_attempts: default_api_download_attempts(),
            csv_download_attempts: default_csv_download_attempts(),
            batch_pause_every: default_batch_pause_every(),
            batch_pause_ms: default_batch_pause_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            emit_header: default_emit_header(),
            link_column: default_link_column(),
            rules: ExtractionRules::default(),
        }
    }
}
