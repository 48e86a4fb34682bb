pub mod connection;
pub mod price_repository;

pub use connection::*;
pub use price_repository::*;
