use crate::error::ConfigError;
use crate::language::{AUTO, AUTO_PRIMARY_LANGUAGE, POSSIBLE_LANGUAGES};
use crate::types::AudioEncoding;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub recognition: RecognizerConfig,

    #[serde(default)]
    pub translation: TranslatorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_true")]
    pub cors: bool,

    /// Keep the historical `translate-audio` behaviour of answering 200 with
    /// an empty translation when recognition or translation fails.
    #[serde(default = "default_true")]
    pub audio_errors_as_empty_translation: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            cors: default_true(),
            audio_errors_as_empty_translation: default_true(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AudioConfig {
    #[serde(default = "default_device_name")]
    pub device_name: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Samples per emitted frame.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    /// Frames buffered between the device callback and the recognizer.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            sample_rate: default_sample_rate(),
            chunk_size: default_chunk_size(),
            queue_depth: default_queue_depth(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecognizerConfig {
    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default = "default_auto_primary_language")]
    pub auto_primary_language: String,

    #[serde(default = "default_auto_alternative_languages")]
    pub auto_alternative_languages: Vec<String>,

    #[serde(default = "default_auto_model")]
    pub auto_model: String,

    #[serde(default = "default_known_model")]
    pub known_model: String,

    #[serde(default = "default_upload_encoding")]
    pub upload_encoding: AudioEncoding,

    #[serde(default = "default_upload_sample_rate")]
    pub upload_sample_rate: u32,

    #[serde(default = "default_upload_source")]
    pub upload_source: String,

    /// For `auto` requests, report the language the recognizer settled on
    /// instead of the primary hypothesis it was primed with.
    #[serde(default)]
    pub report_detected_language: bool,

    /// Per-engine tables such as `[recognition.google]`.
    #[serde(flatten)]
    pub engines: toml::Value,
}

impl RecognizerConfig {
    /// Options table for the selected engine, empty if none was given.
    pub fn engine_options(&self) -> toml::Value {
        engine_table(&self.engines, &self.engine)
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            auto_primary_language: default_auto_primary_language(),
            auto_alternative_languages: default_auto_alternative_languages(),
            auto_model: default_auto_model(),
            known_model: default_known_model(),
            upload_encoding: default_upload_encoding(),
            upload_sample_rate: default_upload_sample_rate(),
            upload_source: default_upload_source(),
            report_detected_language: false,
            engines: toml::Value::Table(Default::default()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslatorConfig {
    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(flatten)]
    pub engines: toml::Value,
}

impl TranslatorConfig {
    pub fn engine_options(&self) -> toml::Value {
        engine_table(&self.engines, &self.engine)
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            engines: toml::Value::Table(Default::default()),
        }
    }
}

fn engine_table(engines: &toml::Value, name: &str) -> toml::Value {
    engines
        .get(name)
        .cloned()
        .unwrap_or_else(|| toml::Value::Table(Default::default()))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_device_name() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_chunk_size() -> u32 {
    default_sample_rate() / 10
}

fn default_queue_depth() -> usize {
    64
}

fn default_engine() -> String {
    "google".to_string()
}

fn default_auto_primary_language() -> String {
    AUTO_PRIMARY_LANGUAGE.to_string()
}

fn default_auto_alternative_languages() -> Vec<String> {
    POSSIBLE_LANGUAGES.iter().map(|s| s.to_string()).collect()
}

fn default_auto_model() -> String {
    "latest_long".to_string()
}

fn default_known_model() -> String {
    "default".to_string()
}

fn default_upload_encoding() -> AudioEncoding {
    AudioEncoding::WebmOpus
}

fn default_upload_sample_rate() -> u32 {
    48000
}

fn default_upload_source() -> String {
    AUTO.to_string()
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex");
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                errors.push(var_name.to_string());
            }
        }
    }

    if let Some(first_missing) = errors.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound(first_missing));
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        tracing::debug!(
            recognizer = %config.recognition.engine,
            translator = %config.translation.engine,
            "configuration parsed"
        );
        Ok(config)
    }

    /// `host:port` the HTTP server binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
