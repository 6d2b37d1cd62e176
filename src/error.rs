use thiserror::Error;

use crate::generator::GenerationError;

/// Errors that can occur while generating, storing or querying recipes
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Request data failed validation
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The generation service could not produce a response
    #[error("Failed to generate recipe: {0}")]
    Generation(#[from] GenerationError),

    /// No active recipe with this id
    #[error("Recipe not found: {0}")]
    RecipeNotFound(u64),

    /// The client already rated this recipe
    #[error("You have already rated this recipe")]
    DuplicateRating,

    /// Requested page lies past the end of the result set
    #[error("Invalid page: {0}")]
    InvalidPage(usize),

    /// Persistence layer failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading input files failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeneratorError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        GeneratorError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
