pub mod client;
pub mod error;
pub mod parse;

pub use client::{EmmsaClient, EMMSA_PRICES_URL};
pub use error::ScraperError;
pub use parse::parse_price_table;
