pub mod market_chart;
pub mod price_sample;

pub use market_chart::*;
pub use price_sample::*;
