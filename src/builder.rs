use std::sync::Arc;

use crate::config::GenerationConfig;
use crate::generator::{RetryingGenerator, TextGenerator};
use crate::pipeline::RecipeGenerator;
use crate::store::{MemoryStore, RecipeStore};
use crate::GeneratorError;

/// Builder for configuring the generation workflow
#[derive(Default)]
pub struct RecipeGeneratorBuilder {
    generator: Option<Arc<dyn TextGenerator>>,
    store: Option<Arc<dyn RecipeStore>>,
    config: Option<GenerationConfig>,
    model: Option<String>,
}

impl RecipeGeneratorBuilder {
    /// Set the text-generation service
    ///
    /// # Example
    /// ```
    /// use recipe_generator::{RecipeGenerator, StaticGenerator};
    ///
    /// let builder = RecipeGenerator::builder()
    ///     .generator(StaticGenerator::new("TITLE: Toast"));
    /// ```
    pub fn generator(mut self, generator: impl TextGenerator + 'static) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    /// Set a text-generation service that is shared with other owners
    pub fn shared_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the store that receives recipes and generation records
    ///
    /// Defaults to a fresh [`MemoryStore`].
    pub fn store(mut self, store: Arc<dyn RecipeStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set retry, timeout and model settings
    ///
    /// # Example
    /// ```
    /// use recipe_generator::{GenerationConfig, RecipeGenerator};
    ///
    /// let builder = RecipeGenerator::builder()
    ///     .config(GenerationConfig { retry_attempts: 1, ..Default::default() });
    /// ```
    pub fn config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the model name recorded on generation records
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Build the workflow
    ///
    /// # Errors
    /// Returns `GeneratorError::BuilderError` if no generator was set.
    pub fn build(self) -> Result<RecipeGenerator, GeneratorError> {
        let generator = self.generator.ok_or_else(|| {
            GeneratorError::BuilderError(
                "No text generator specified. Use .generator()".to_string(),
            )
        })?;
        let config = self.config.unwrap_or_default();
        let model = self.model.unwrap_or_else(|| config.model.clone());

        Ok(RecipeGenerator {
            generator: RetryingGenerator::new(generator, &config),
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryStore::new())),
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::StaticGenerator;

    #[test]
    fn test_build_requires_generator() {
        let result = RecipeGenerator::builder().build();
        assert!(matches!(result, Err(GeneratorError::BuilderError(_))));
    }

    #[test]
    fn test_model_defaults_to_config() {
        let generator = RecipeGenerator::builder()
            .generator(StaticGenerator::new("TITLE: x"))
            .build()
            .unwrap();
        assert_eq!(generator.model(), "gemini-1.5-flash");

        let generator = RecipeGenerator::builder()
            .generator(StaticGenerator::new("TITLE: x"))
            .model("gemini-2.0-pro")
            .build()
            .unwrap();
        assert_eq!(generator.model(), "gemini-2.0-pro");
    }
}
