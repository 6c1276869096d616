pub mod basket;
pub mod client;
pub mod error;

pub use basket::basket_name;
pub use client::{PantryClient, DEFAULT_BASE_URL};
pub use error::PantryError;
