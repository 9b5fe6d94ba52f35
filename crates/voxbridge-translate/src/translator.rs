use async_trait::async_trait;
use voxbridge_core::{TranslateError, Translation};

/// A machine translation backend.
///
/// Backends take bare base codes (`fr`, not `fr-FR`); callers strip
/// regions first.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Registry name (e.g. `"google"`, `"passthrough"`).
    fn name(&self) -> &str;
    /// One-time initialisation with backend-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), TranslateError>;
    /// Translate `text` into `target`. `source == None` asks the backend
    /// to detect the language itself.
    async fn translate(
        &self,
        text: &str,
        target: &str,
        source: Option<&str>,
    ) -> Result<Translation, TranslateError>;
}
