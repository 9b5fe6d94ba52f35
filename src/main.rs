use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "voxbridge", about = "Speech and text translation server")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Override `server.port`
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = voxbridge_core::AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!("voxbridge starting");

    match voxbridge_audio::DeviceManager::new().list_input_devices() {
        Ok(devices) => {
            for (name, _) in &devices {
                tracing::debug!("input device available: {name}");
            }
        }
        Err(e) => tracing::warn!("could not enumerate input devices: {e}"),
    }
    tracing::info!("using input device: {}", config.audio.device_name);
    let input = Arc::new(voxbridge_audio::CpalBackend::new(
        config.audio.device_name.clone(),
    ));

    let recognizer: Arc<dyn voxbridge_engine::SpeechRecognizer> = Arc::from(
        voxbridge_engine::RecognizerRegistry::new()
            .build(
                &config.recognition.engine,
                config.recognition.engine_options(),
            )
            .await
            .with_context(|| {
                format!(
                    "failed to initialize speech recognizer '{}'",
                    config.recognition.engine
                )
            })?,
    );

    let translator: Arc<dyn voxbridge_translate::Translator> = Arc::from(
        voxbridge_translate::TranslatorRegistry::new()
            .build(
                &config.translation.engine,
                config.translation.engine_options(),
            )
            .await
            .with_context(|| {
                format!(
                    "failed to initialize translator '{}'",
                    config.translation.engine
                )
            })?,
    );

    let state = voxbridge_server::AppState::new(
        &config,
        input,
        Arc::clone(&recognizer),
        translator,
    );
    let app = voxbridge_server::router(state, &config.server);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on http://{addr}");

    voxbridge_server::serve(listener, app)
        .await
        .context("server error")?;

    tracing::info!("shutting down");
    if let Err(e) = recognizer.shutdown().await {
        tracing::warn!("recognizer shutdown failed: {e}");
    }

    Ok(())
}
