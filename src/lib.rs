pub mod archetype;
pub mod config;
pub mod costs;
pub mod deck;
pub mod error;
pub mod impact;
pub mod output;
pub mod providers;
pub mod scoring;
pub mod types;
pub mod viability;

pub use error::AnalysisError;
pub use types::{CardLevelInfo, CollectionSnapshot, Rarity};
