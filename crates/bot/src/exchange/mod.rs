pub mod bybit;
pub mod gateway;

pub use gateway::{MarketDataGateway, UniverseFilter};
