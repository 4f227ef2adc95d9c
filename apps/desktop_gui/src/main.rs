use std::{path::PathBuf, time::Duration};

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::{
    commands::BackendCommand,
    runtime::{self, BackendConfig},
};
use capture::SimulatedAccess;
use clap::Parser;
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use liveness_core::load_settings_from;
use tracing_subscriber::EnvFilter;
use ui::LivenessApp;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, conflicts_with = "no_camera")]
    deny_camera: bool,
    #[arg(long)]
    no_camera: bool,
    #[arg(long, default_value_t = 400)]
    permission_delay_ms: u64,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let access = if args.deny_camera {
        SimulatedAccess::Deny
    } else if args.no_camera {
        SimulatedAccess::NoDevice
    } else {
        SimulatedAccess::Grant
    };
    let config = BackendConfig {
        settings: load_settings_from(args.config.as_deref()),
        access,
        permission_delay: Duration::from_millis(args.permission_delay_ms),
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    let backend = runtime::launch(config, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Face Verification")
            .with_inner_size([760.0, 480.0])
            .with_min_inner_size([680.0, 420.0]),
        ..Default::default()
    };
    let app_cmd_tx = cmd_tx.clone();
    let result = eframe::run_native(
        "Face Verification",
        options,
        Box::new(move |_cc| Ok(Box::new(LivenessApp::new(app_cmd_tx, ui_rx)))),
    );

    let _ = cmd_tx.send(BackendCommand::Shutdown);
    if backend.join().is_err() {
        tracing::error!("backend worker panicked during shutdown");
    }
    result
}
