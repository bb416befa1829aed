use serde::{Deserialize, Serialize};

/// One vocabulary item as it ends up on a flashcard.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct LexemeEntry {
    #[serde(default)]
    pub word: String,

    #[serde(default)]
    pub translation: String,

    #[serde(default)]
    pub audio_url: Option<String>,
}

impl LexemeEntry {
    pub fn new(
        word: impl Into<String>,
        translation: impl Into<String>,
        audio_url: Option<String>,
    ) -> Self {
        Self {
            word: word.into(),
            translation: translation.into(),
            audio_url: audio_url.filter(|u| !u.trim().is_empty()),
        }
    }

    pub fn has_audio(&self) -> bool {
        self.audio_url.is_some()
    }
}
