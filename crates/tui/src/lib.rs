pub mod cli;
pub mod commands;
pub mod config;
pub mod telemetry;
pub mod tui;

pub use taskgrid_core as core;
pub use taskgrid_core::model;
pub use taskgrid_core::storage;

pub use taskgrid_core::AppConfig;
