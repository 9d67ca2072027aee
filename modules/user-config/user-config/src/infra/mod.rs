//! Infrastructure layer for the user config module.

pub mod storage;

pub use storage::{InMemoryUserConfigRepository, SeaOrmUserConfigRepository};
