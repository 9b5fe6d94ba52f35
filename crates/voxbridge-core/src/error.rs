use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("failed to enumerate devices: {0}")]
    DeviceEnumeration(String),

    #[error("failed to build stream: {0}")]
    StreamBuild(String),

    #[error("stream error: {0}")]
    StreamError(String),

    #[error("capture stream already consumed")]
    StreamConsumed,
}

#[derive(Debug, Error)]
pub enum AsrError {
    #[error("ASR initialization failed: {0}")]
    InitializationFailed(String),

    #[error("ASR request failed: {0}")]
    RequestFailed(String),

    #[error("ASR response invalid: {0}")]
    InvalidResponse(String),

    #[error("ASR engine not found: {0}")]
    EngineNotFound(String),
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("translator initialization failed: {0}")]
    InitializationFailed(String),

    #[error("translation request failed: {0}")]
    RequestFailed(String),

    #[error("translation response invalid: {0}")]
    InvalidResponse(String),

    #[error("translator not found: {0}")]
    NotFound(String),
}

/// Failure of a capture -> recognize -> translate run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Asr(#[from] AsrError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error("failed to stage recording: {0}")]
    Recording(#[from] std::io::Error),
}
