pub mod column;
pub mod commands;
pub mod config;
pub mod filter;
pub mod model;
pub mod pagination;
pub mod schema;
pub mod seed;
pub mod services;
pub mod sort;
pub mod storage;
pub mod store;

pub use commands::{delete_tasks, open_board};
pub use config::AppConfig;
pub use model::*;
pub use services::{Board, TableSnapshot};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage};
pub use store::TaskStore;
