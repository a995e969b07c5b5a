mod app;
mod config;
mod source;
mod util;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Args;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> eframe::Result<()> {
    init_tracing();

    let args = Args::parse();
    let settings = match args.view_settings() {
        Ok(settings) => settings,
        Err(error) => {
            error!("{error:#}");
            std::process::exit(2);
        }
    };
    info!(payload = %args.payload.display(), "starting relgraph");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height])
            .with_title("relgraph"),
        ..Default::default()
    };

    eframe::run_native(
        "relgraph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::RelGraphApp::new(
                cc,
                args.payload.clone(),
                settings.clone(),
                args.record_url.clone(),
            )))
        }),
    )
}
