//! The generation workflow: request → prompt → generation → extraction → storage.

use log::{error, info};
use std::sync::Arc;
use std::time::Instant;

use crate::builder::RecipeGeneratorBuilder;
use crate::error::GeneratorError;
use crate::extractor::ResponseExtractor;
use crate::generator::{RetryingGenerator, TextGenerator};
use crate::model::RecipeRequest;
use crate::prompt::build_prompt;
use crate::store::{NewGeneration, NewRecipe, Recipe, RecipeStore};

/// Runs generations against one text generator and one store.
///
/// Every call leaves a generation record behind, successful or not.
pub struct RecipeGenerator {
    pub(crate) generator: RetryingGenerator<Arc<dyn TextGenerator>>,
    pub(crate) store: Arc<dyn RecipeStore>,
    pub(crate) model: String,
}

impl RecipeGenerator {
    /// Creates a new builder for the generation workflow
    pub fn builder() -> RecipeGeneratorBuilder {
        RecipeGeneratorBuilder::default()
    }

    pub fn store(&self) -> &Arc<dyn RecipeStore> {
        &self.store
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate, parse and store one recipe for `request`.
    ///
    /// # Errors
    /// Returns `GeneratorError` if:
    /// - the request fails validation (nothing is recorded)
    /// - the generation service fails after all retries
    /// - the store rejects the recipe or the generation record
    ///
    /// Except for validation, every failure leaves a failed generation record.
    pub async fn generate(&self, request: &RecipeRequest) -> Result<Recipe, GeneratorError> {
        request.validate()?;

        let started = Instant::now();
        let prompt = build_prompt(request);

        let reply = match self.generator.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                let e = GeneratorError::from(e);
                self.record_failure(request, started.elapsed().as_secs_f64(), &e);
                return Err(e);
            }
        };
        let generation_time = started.elapsed().as_secs_f64();

        match self.persist(&reply, request, generation_time) {
            Ok(recipe) => {
                info!(
                    "Generated recipe {} \"{}\" in {:.2}s",
                    recipe.id, recipe.title, generation_time
                );
                Ok(recipe)
            }
            Err(e) => {
                self.record_failure(request, generation_time, &e);
                Err(e)
            }
        }
    }

    fn persist(
        &self,
        reply: &str,
        request: &RecipeRequest,
        generation_time: f64,
    ) -> Result<Recipe, GeneratorError> {
        let extracted = ResponseExtractor::extract(reply, request);
        let recipe = self
            .store
            .insert_recipe(NewRecipe::from_generation(extracted, request))?;

        self.store.record_generation(NewGeneration {
            recipe_id: Some(recipe.id),
            request: request.clone(),
            generation_time,
            model_used: self.model.clone(),
            successful: true,
            error_message: None,
        })?;
        Ok(recipe)
    }

    /// Keeps a failed generation record. If the store rejects it, that is only logged.
    fn record_failure(&self, request: &RecipeRequest, generation_time: f64, e: &GeneratorError) {
        error!("Recipe generation failed: {}", e);
        let record = NewGeneration {
            recipe_id: None,
            request: request.clone(),
            generation_time,
            model_used: self.model.clone(),
            successful: false,
            error_message: Some(e.to_string()),
        };
        if let Err(store_err) = self.store.record_generation(record) {
            error!("Could not record failed generation: {}", store_err);
        }
    }
}
