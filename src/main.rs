mod app;
mod chat;
mod clock;
mod event;
mod settings;
mod theme;

use app::MockChatApp;
use chat::session::ChatSession;
use chrono::Local;
use clock::ChatClock;
use eframe::egui;
use settings::Settings;
use std::sync::mpsc;
use theme::Theme;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let settings = Settings::load()?;
    tracing::info!(agent = %settings.agent_name, seeded = settings.seed.is_some(), "settings loaded");
    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("mockchat-clock")
        .build()?;

    let session = ChatSession::new(
        settings.agent_name.clone(),
        settings.timings(),
        settings.rng(),
        Local::now(),
    );
    let clock = runtime.block_on(async { ChatClock::new(session, tx) })?;
    clock.start();

    let theme = Theme::default();
    let app = MockChatApp::new(rx, clock.clone(), theme.clone());
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([440.0, 760.0])
            .with_min_inner_size([320.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        &settings.agent_name,
        native_options,
        Box::new(move |creation_context| {
            theme.apply_visuals(&creation_context.egui_ctx);
            clock.attach_repaint(creation_context.egui_ctx.clone());
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
