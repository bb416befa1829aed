//! Local media naming and the flashcard playback reference syntax

use url::Url;

pub const AUDIO_EXTENSION: &str = ".mp3";

const SOUND_PREFIX: &str = "[sound:";
const SOUND_SUFFIX: &str = "]";

/// Local filename for an audio URL: the last path segment, with `.mp3`
/// appended unless it already ends with it (any case).
///
/// Strings that are not absolute URLs (bare names, relative paths) are
/// handled by cutting off any query or fragment and splitting on `/`.
pub fn derive_filename(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }

    let last = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|s| s.last())
            .unwrap_or("")
            .to_string(),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or("");
            path.rsplit('/').next().unwrap_or("").to_string()
        }
    };

    if last.to_lowercase().ends_with(AUDIO_EXTENSION) {
        last
    } else {
        format!("{last}{AUDIO_EXTENSION}")
    }
}

pub fn sound_reference(filename: &str) -> String {
    if filename.is_empty() {
        return String::new();
    }
    format!("{SOUND_PREFIX}{filename}{SOUND_SUFFIX}")
}

/// Inverse of [`sound_reference`].
pub fn parse_sound_reference(reference: &str) -> Option<&str> {
    reference
        .trim()
        .strip_prefix(SOUND_PREFIX)
        .and_then(|r| r.strip_suffix(SOUND_SUFFIX))
        .filter(|name| !name.is_empty())
}
