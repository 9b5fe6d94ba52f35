use crate::translator::Translator;
use voxbridge_core::language::AUTO;
use voxbridge_core::{base_code, TranslateError, TranslationResult};

/// Translate free text for the text endpoint.
///
/// Regions are stripped from both codes before the backend sees them. With
/// `source == "auto"` no hint is sent and the backend's detected language
/// is reported, falling back to `"unknown"`.
pub async fn translate_text(
    translator: &dyn Translator,
    text: &str,
    target: &str,
    source: &str,
) -> Result<TranslationResult, TranslateError> {
    if text.trim().is_empty() {
        return Err(TranslateError::InvalidInput("Empty text input.".to_string()));
    }

    let target = base_code(target);
    let source_hint = (source != AUTO).then(|| base_code(source));

    let translation = translator.translate(text, target, source_hint).await?;

    let detected_language = translation
        .detected_source_language
        .or_else(|| source_hint.map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string());

    Ok(TranslationResult {
        input: text.to_string(),
        detected_language,
        target_language: target.to_string(),
        translated: translation.translated_text,
    })
}

/// Translate a recognized transcript. Pairs sharing a base code skip the
/// backend and return the transcript unchanged.
pub async fn translate_transcript(
    translator: &dyn Translator,
    transcript: &str,
    source_language: &str,
    target_language: &str,
) -> Result<String, TranslateError> {
    let source = base_code(source_language);
    let target = base_code(target_language);
    if source.eq_ignore_ascii_case(target) {
        return Ok(transcript.to_string());
    }
    let translation = translator.translate(transcript, target, Some(source)).await?;
    Ok(translation.translated_text)
}
