//! iced front end for the notas dashboard.

use std::path::PathBuf;

use iced::{Application, Settings};

use crate::api::client::NotasApiClient;

pub mod app;
pub mod commands;
pub mod components;
pub mod error_map;
pub mod tabs;
pub mod telemetry;

/// Flags supplied by the binary entrypoint when launching the GUI.
#[derive(Debug, Clone)]
pub struct DashboardFlags {
    /// Pre-configured client used to communicate with the notas service.
    pub client: NotasApiClient,
    /// Optional configuration file path re-read for GUI settings.
    pub config_path: Option<PathBuf>,
}

/// Launches the dashboard GUI using the provided flags.
pub fn launch(flags: DashboardFlags) -> iced::Result {
    app::DashboardApp::run(Settings::with_flags(flags))
}
