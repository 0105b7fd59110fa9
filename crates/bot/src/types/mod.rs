pub mod market_data;
pub mod signal;
pub mod timeframe;

pub use market_data::*;
pub use signal::*;
pub use timeframe::Timeframe;
