pub use taskgrid_tui::cli;
pub use taskgrid_tui::commands;
pub use taskgrid_tui::config;
pub use taskgrid_tui::telemetry;
pub use taskgrid_tui::tui;
pub use taskgrid_tui::AppConfig;

pub use taskgrid_core as core;
pub use taskgrid_core::model;
pub use taskgrid_core::storage;
pub use taskgrid_core::Board;
