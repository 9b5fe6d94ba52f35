use crate::translator::Translator;
use std::collections::HashMap;
use voxbridge_core::TranslateError;

pub struct TranslatorRegistry {
    factories: HashMap<String, fn() -> Box<dyn Translator>>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("passthrough", || {
            Box::new(crate::passthrough::PassthroughTranslator::new())
        });
        registry.register("google", || Box::new(crate::google::GoogleTranslator::new()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn Translator>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Translator>, TranslateError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| TranslateError::NotFound(name.to_string()))
    }

    /// Create and initialise in one step.
    pub async fn build(
        &self,
        name: &str,
        config: toml::Value,
    ) -> Result<Box<dyn Translator>, TranslateError> {
        let mut translator = self.create(name)?;
        translator.initialize(config).await?;
        tracing::info!(translator = name, "translator ready");
        Ok(translator)
    }

    pub fn list_translators(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for TranslatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
