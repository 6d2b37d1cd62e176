//! Personalized recipe generation backend.
//!
//! A caller's [`RecipeRequest`] is turned into a prompt, sent to an external
//! text-generation service, and the free-text reply is parsed by
//! [`ResponseExtractor`] into typed fields before being stored. The
//! [`Catalog`] serves search, detail, rating and statistics queries over the
//! stored recipes.

pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod store;

pub use builder::RecipeGeneratorBuilder;
pub use catalog::{Catalog, Page, SearchParams, SortOrder};
pub use config::{AppConfig, CatalogConfig, GenerationConfig};
pub use error::GeneratorError;
pub use extractor::{extract, ExtractedRecipe, Nutrition, ResponseExtractor};
pub use generator::{GenerationError, RetryingGenerator, StaticGenerator, TextGenerator};
pub use model::{CookingTime, Difficulty, MealType, RecipeRequest};
pub use pipeline::RecipeGenerator;
pub use prompt::build_prompt;
pub use store::{MemoryStore, NewRecipe, RatingInput, Recipe, RecipeStore};

/// Parse a saved generation reply without any other side effects.
///
/// # Example
/// ```
/// use recipe_generator::{extract_from_text, RecipeRequest};
///
/// let recipe = extract_from_text("TITLE: Miso Soup\nPREP_TIME: 5\nCOOK_TIME: 10", None);
/// assert_eq!(recipe.title, "Miso Soup");
/// assert_eq!(recipe.total_time_minutes, Some(15));
/// ```
pub fn extract_from_text(raw_text: &str, request: Option<&RecipeRequest>) -> ExtractedRecipe {
    match request {
        Some(request) => ResponseExtractor::extract(raw_text, request),
        None => ResponseExtractor::extract(raw_text, &RecipeRequest::default()),
    }
}
