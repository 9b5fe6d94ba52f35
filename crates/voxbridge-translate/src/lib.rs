pub mod google;
pub mod passthrough;
pub mod registry;
pub mod text;
pub mod translator;

pub use google::GoogleTranslator;
pub use passthrough::PassthroughTranslator;
pub use registry::TranslatorRegistry;
pub use text::{translate_text, translate_transcript};
pub use translator::Translator;
