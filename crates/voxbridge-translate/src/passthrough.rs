use crate::translator::Translator;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use voxbridge_core::{TranslateError, Translation};

/// Identity translator: hands the input back unchanged.
pub struct PassthroughTranslator {
    call_count: AtomicUsize,
}

impl PassthroughTranslator {
    pub fn new() -> Self {
        Self {
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Default for PassthroughTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for PassthroughTranslator {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), TranslateError> {
        Ok(())
    }

    async fn translate(
        &self,
        text: &str,
        _target: &str,
        source: Option<&str>,
    ) -> Result<Translation, TranslateError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(Translation {
            translated_text: text.to_string(),
            detected_source_language: source.map(str::to_string),
        })
    }
}
