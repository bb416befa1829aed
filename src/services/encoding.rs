use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
    pub had_errors: bool,
}

/// Decode raw bytes: BOM first, then strict UTF-8, then a chardetng guess.
pub fn decode(bytes: &[u8]) -> DecodedText {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return DecodedText {
            text: text.into_owned(),
            encoding: encoding.name(),
            had_errors,
        };
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: text.to_string(),
            encoding: UTF_8.name(),
            had_errors: false,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    let (text, _, had_errors) = encoding.decode(bytes);
    DecodedText {
        text: text.into_owned(),
        encoding: encoding.name(),
        had_errors,
    }
}

/// Read a whole text input file (capture, link list), tolerating BOMs and
/// legacy encodings from spreadsheet or editor exports.
pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::missing_input(path));
    }

    let bytes = fs::read(path)?;
    let decoded = decode(&bytes);

    if decoded.encoding != UTF_8.name() || decoded.had_errors {
        debug!(
            "decoded {} as {} (errors: {})",
            path.display(),
            decoded.encoding,
            decoded.had_errors
        );
    }

    Ok(decoded.text)
}
