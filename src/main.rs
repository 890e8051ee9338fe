use anyhow::Result;
use penchat::backend::HttpBackend;
use penchat::config::ClientConfig;
use penchat::dispatch::Dispatcher;
use penchat::ui::{AppState, PenchatApp, SharedView};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "penchat=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    config.validate()?;
    info!("Starting Penchat against {}", config.backend_url);

    // Dispatch tasks run here while eframe owns the main thread.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let (playback_tx, _audio_output) = setup_playback(&config);

    let backend = Arc::new(HttpBackend::new(&config.backend_url));
    let view = SharedView::new(playback_tx);
    let dispatcher = Arc::new(
        Dispatcher::new(backend.clone(), Arc::new(view.clone()))
            .with_autoplay_own_voice(config.autoplay_own_voice),
    );

    let state = AppState::new(config, backend, dispatcher, view, runtime.handle().clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title("Penchat"),
        ..Default::default()
    };

    eframe::run_native(
        "Penchat",
        options,
        Box::new(|cc| Ok(Box::new(PenchatApp::new(cc, state)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start UI: {}", e))?;

    Ok(())
}

/// Open the speaker and return the clip channel feeding it. A missing device
/// disables playback but never blocks the chat.
#[cfg(feature = "audio-io")]
fn setup_playback(
    config: &ClientConfig,
) -> (
    Option<crossbeam_channel::Sender<penchat::messages::AudioClip>>,
    Option<penchat::audio::AudioOutput>,
) {
    if !config.enable_audio_output {
        info!("Audio output disabled by configuration");
        return (None, None);
    }

    let mut output = match penchat::audio::AudioOutput::open() {
        Ok(output) => output,
        Err(e) => {
            warn!("No audio playback available: {}", e);
            return (None, None);
        }
    };

    let (tx, rx) = crossbeam_channel::unbounded();
    if let Err(e) = output.start(rx) {
        warn!("Failed to start audio playback: {}", e);
        return (None, None);
    }

    (Some(tx), Some(output))
}

#[cfg(not(feature = "audio-io"))]
fn setup_playback(
    _config: &ClientConfig,
) -> (
    Option<crossbeam_channel::Sender<penchat::messages::AudioClip>>,
    Option<()>,
) {
    warn!("Built without audio-io; audio playback disabled");
    (None, None)
}
