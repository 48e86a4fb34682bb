pub mod price_feed;
pub mod price_storage;
pub mod tracker_service;

pub use price_feed::*;
pub use price_storage::*;
pub use tracker_service::*;
