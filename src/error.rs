use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("insufficient cards: {available} available, {required} required")]
    InsufficientCards { available: usize, required: usize },
    #[error("deck failed validation: {0}")]
    Structural(String),
}
