//! Storage adapters for user configs.

pub mod entity;
pub mod evaluate;
pub mod mapper;
pub mod memory_repo;
pub mod migrations;
pub mod sea_orm_repo;

pub use memory_repo::InMemoryUserConfigRepository;
pub use sea_orm_repo::SeaOrmUserConfigRepository;
