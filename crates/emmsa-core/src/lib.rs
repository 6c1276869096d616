pub mod config;
pub mod error;
pub mod prices;

pub use config::{
    load_scraper_config, load_scraper_config_from_env, load_store_config,
    load_store_config_from_env, ScraperConfig, StoreConfig, PANTRY_API_KEY_VAR,
};
pub use error::ConfigError;
pub use prices::{PriceBatch, PriceRecord};
