pub mod error;
pub mod filter;
pub mod guards;
pub mod repo;
pub mod service;
pub mod tags;
