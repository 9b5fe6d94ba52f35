pub mod google;
pub mod null_recognizer;
pub mod recognizer;
pub mod registry;
pub mod session;

pub use google::GoogleSpeechRecognizer;
pub use null_recognizer::NullRecognizer;
pub use recognizer::{ResponseStream, SpeechRecognizer};
pub use registry::RecognizerRegistry;
pub use session::{first_final_transcript, first_transcript, RecognitionProfile};
