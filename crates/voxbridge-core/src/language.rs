//! Language code handling shared by the recognizer and translator paths.
//!
//! Recognizers want full BCP-47 locale tags (`en-US`), translators want bare
//! base codes (`en`). Callers normalize once on the way in and strip regions
//! right before talking to a translator.

use std::fmt;

/// Short ISO code to the locale tag the recognizer expects.
pub const LANGUAGE_CODE_MAP: &[(&str, &str)] = &[
    ("en", "en-US"),
    ("hi", "hi-IN"),
    ("es", "es-ES"),
    ("fr", "fr-FR"),
    ("de", "de-DE"),
    ("ta", "ta-IN"),
    ("te", "te-IN"),
    ("ar", "ar-SA"),
    ("zh", "zh"),
    ("ja", "ja-JP"),
];

/// Candidate languages offered to the recognizer when the source is `auto`.
pub const POSSIBLE_LANGUAGES: &[&str] = &[
    "en-US", "hi-IN", "es-ES", "fr-FR", "de-DE", "ta-IN", "te-IN", "ar-SA", "zh", "ja-JP",
];

/// Primary hypothesis used alongside [`POSSIBLE_LANGUAGES`] for `auto`.
pub const AUTO_PRIMARY_LANGUAGE: &str = "hi-IN";

pub const AUTO: &str = "auto";

/// Map a short code to its full locale tag. Unknown codes pass through.
pub fn normalize(code: &str) -> String {
    LANGUAGE_CODE_MAP
        .iter()
        .find(|(short, _)| *short == code)
        .map(|(_, full)| (*full).to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Strip any region suffix: `fr-FR` -> `fr`.
pub fn base_code(code: &str) -> &str {
    code.split('-').next().unwrap_or(code)
}

/// Restore conventional casing on a locale tag reported by a service:
/// `fr-fr` -> `fr-FR`, `zh-hant-tw` -> `zh-Hant-TW`.
pub fn canonical_tag(code: &str) -> String {
    if let Some(known) = POSSIBLE_LANGUAGES
        .iter()
        .find(|tag| tag.eq_ignore_ascii_case(code))
    {
        return (*known).to_string();
    }

    let mut parts = code.split('-');
    let mut tag = parts.next().unwrap_or_default().to_ascii_lowercase();
    for part in parts {
        tag.push('-');
        match part.len() {
            2 => tag.push_str(&part.to_ascii_uppercase()),
            4 => {
                let (first, rest) = part.split_at(1);
                tag.push_str(&first.to_ascii_uppercase());
                tag.push_str(&rest.to_ascii_lowercase());
            }
            _ => tag.push_str(part),
        }
    }
    tag
}

/// Source language as requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLanguage {
    Auto,
    Known(String),
}

impl SourceLanguage {
    /// Parse a request parameter. `auto` stays symbolic, anything else is
    /// normalized to a locale tag.
    pub fn parse(code: &str) -> Self {
        if code == AUTO {
            SourceLanguage::Auto
        } else {
            SourceLanguage::Known(normalize(code))
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, SourceLanguage::Auto)
    }

    /// Base code for a translator source hint; `None` lets the service detect.
    pub fn translator_hint(&self) -> Option<&str> {
        match self {
            SourceLanguage::Auto => None,
            SourceLanguage::Known(code) => Some(base_code(code)),
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLanguage::Auto => f.write_str(AUTO),
            SourceLanguage::Known(code) => f.write_str(code),
        }
    }
}
