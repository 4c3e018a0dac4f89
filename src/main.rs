//! Application entry point — Proofscribe.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Build the remote API client from config.
//! 4. Create the relay pair and the hotkey command channel.
//! 5. Spawn the background service and a content context over the headless
//!    in-memory page.
//! 6. Spawn the hotkey listener thread.
//! 7. Wait for Ctrl-C.
//!
//! The in-memory page stands in for a real host document: it carries a
//! pre-seeded editable field so the proofread hotkey has something to work
//! on out of the box.

use std::sync::Arc;

use tokio::sync::mpsc;

use proofscribe::{
    audio::AudioSession,
    background::Background,
    config::AppConfig,
    content::ContentContext,
    hotkey::{parse_key, HotkeyListener, UserCommand},
    page::{MemoryField, MemoryPage},
    relay,
    remote::{ApiClient, Proofread, Transcribe},
};

#[tokio::main]
async fn main() {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Proofscribe starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    if config.api.api_key.is_none() {
        log::warn!("No api_key configured; remote calls will fail until one is set");
    }

    // 3. Remote client — one instance serves both traits
    let api = Arc::new(ApiClient::from_config(&config.api));
    let transcriber: Arc<dyn Transcribe> = api.clone();
    let proofreader: Arc<dyn Proofread> = api;

    // 4. Relay + command channel
    let (content_side, background_side) = relay::pair(16);
    let (commands_tx, commands_rx) = mpsc::channel::<UserCommand>(16);

    // 5. Services
    let background = Background::new(background_side.handle(), transcriber, proofreader);
    tokio::spawn(background.run(background_side, commands_rx));

    let page = MemoryPage::new();
    let field = MemoryField::new("The quick brwon fox jumps over teh lazy dog");
    field.select(0, 43);
    page.focus_field(field);

    let content = ContentContext::new(
        Arc::new(page),
        content_side.handle(),
        config.replace.policy,
        Box::new(AudioSession::with_default_capture),
    );
    tokio::spawn(content.run(content_side));

    // 6. Hotkeys
    let toggle_key = parse_key(&config.hotkey.toggle_transcription_key).unwrap_or_else(|| {
        log::warn!(
            "Unknown key {:?}; falling back to F9",
            config.hotkey.toggle_transcription_key
        );
        rdev::Key::F9
    });
    let proofread_key = parse_key(&config.hotkey.proofread_key).unwrap_or_else(|| {
        log::warn!(
            "Unknown key {:?}; falling back to F10",
            config.hotkey.proofread_key
        );
        rdev::Key::F10
    });
    let _hotkey_listener = HotkeyListener::start(toggle_key, proofread_key, commands_tx);
    log::info!(
        "Listening — {} toggles transcription, {} proofreads the selection",
        config.hotkey.toggle_transcription_key,
        config.hotkey.proofread_key
    );

    // 7. Run until interrupted
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to wait for shutdown signal: {e}");
    }
    log::info!("Proofscribe shutting down");
}
