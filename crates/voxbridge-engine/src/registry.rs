use crate::recognizer::SpeechRecognizer;
use std::collections::HashMap;
use voxbridge_core::AsrError;

pub struct RecognizerRegistry {
    factories: HashMap<String, fn() -> Box<dyn SpeechRecognizer>>,
}

impl RecognizerRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("null", || {
            Box::new(crate::null_recognizer::NullRecognizer::new())
        });
        registry.register("google", || {
            Box::new(crate::google::GoogleSpeechRecognizer::new())
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn SpeechRecognizer>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn SpeechRecognizer>, AsrError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| AsrError::EngineNotFound(name.to_string()))
    }

    /// Create and initialise in one step.
    pub async fn build(
        &self,
        name: &str,
        config: toml::Value,
    ) -> Result<Box<dyn SpeechRecognizer>, AsrError> {
        let mut recognizer = self.create(name)?;
        recognizer.initialize(config).await?;
        tracing::info!(recognizer = name, "speech recognizer ready");
        Ok(recognizer)
    }

    pub fn list_recognizers(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for RecognizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullRecognizer;

    #[test]
    fn test_registry_new_has_builtin_recognizers() {
        let registry = RecognizerRegistry::new();
        let names = registry.list_recognizers();
        assert!(names.contains(&"null"));
        assert!(names.contains(&"google"));
    }

    #[test]
    fn test_registry_create_returns_correct_name() {
        let registry = RecognizerRegistry::new();
        assert_eq!(registry.create("null").unwrap().name(), "null");
        assert_eq!(registry.create("google").unwrap().name(), "google");
    }

    #[test]
    fn test_registry_create_unknown_returns_error() {
        let registry = RecognizerRegistry::new();
        match registry.create("nope") {
            Err(AsrError::EngineNotFound(name)) => assert_eq!(name, "nope"),
            _ => panic!("expected EngineNotFound error"),
        }
    }

    #[test]
    fn test_registry_register_custom_recognizer() {
        let mut registry = RecognizerRegistry::new();
        registry.register("custom", || Box::new(NullRecognizer::new()));
        let recognizer = registry.create("custom").unwrap();
        // NullRecognizer backs the factory, so the name is still "null"
        assert_eq!(recognizer.name(), "null");
    }

    #[tokio::test]
    async fn test_registry_build_google_without_key_fails() {
        let registry = RecognizerRegistry::new();
        let result = registry
            .build("google", toml::Value::Table(Default::default()))
            .await;
        assert!(matches!(result, Err(AsrError::InitializationFailed(_))));
    }

    #[tokio::test]
    async fn test_registry_build_null_succeeds() {
        let registry = RecognizerRegistry::new();
        let result = registry
            .build("null", toml::Value::Table(Default::default()))
            .await;
        assert!(result.is_ok());
    }
}
