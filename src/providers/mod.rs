pub mod strategy;
pub mod synergy;

pub use strategy::{BuiltinStrategies, Strategy, StrategyProfile, StrategyProvider};
pub use synergy::{SynergyCategory, SynergyDb, SynergyPair, SynergyTable};
