//! Persistence collaborator for generated recipes.
//!
//! The store assigns identity, timestamps and default flags. Everything else
//! on a [`Recipe`] comes either from the caller's request or from the extractor.

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;
use crate::extractor::ExtractedRecipe;
use crate::model::{CookingTime, Difficulty, MealType, RecipeRequest};

pub type RecipeId = u64;

/// Fields needed to create a recipe. Also used for manually entered recipes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub meal_type: Option<MealType>,
    pub cuisine_type: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub cooking_time: Option<CookingTime>,
    pub servings: u32,
    pub prep_time: Option<u32>,
    pub cook_time: Option<u32>,
    pub total_time: Option<u32>,
    pub dietary_restrictions: Vec<String>,
    pub allergens: Vec<String>,
    pub calories_per_serving: Option<u32>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub source_ingredients: Vec<String>,
    pub is_featured: bool,
}

impl NewRecipe {
    /// Combine extracted fields with the request that produced them.
    ///
    /// Request values (meal type, cuisines, servings, ...) are copied as-is.
    pub fn from_generation(extracted: ExtractedRecipe, request: &RecipeRequest) -> Self {
        let cuisines: Vec<&str> = request
            .preferred_cuisines
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();

        NewRecipe {
            title: extracted.title,
            description: Some(extracted.description),
            ingredients: extracted.ingredients,
            instructions: extracted.instructions,
            meal_type: request.meal_type,
            cuisine_type: (!cuisines.is_empty()).then(|| cuisines.join(", ")),
            difficulty: request.difficulty,
            cooking_time: request.cooking_time,
            servings: request.servings,
            prep_time: extracted.prep_time_minutes,
            cook_time: extracted.cook_time_minutes,
            total_time: extracted.total_time_minutes,
            dietary_restrictions: request.dietary_restrictions.clone(),
            allergens: Vec::new(),
            calories_per_serving: extracted.nutrition.calories,
            protein: extracted.nutrition.protein,
            carbs: extracted.nutrition.carbs,
            fat: extracted.nutrition.fat,
            fiber: extracted.nutrition.fiber,
            tags: extracted.tags,
            notes: Some(extracted.notes),
            source_ingredients: request.available_ingredients.clone(),
            is_featured: false,
        }
    }
}

/// Nutrition as presented to readers: only values that are present and non-zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub meal_type: Option<MealType>,
    pub cuisine_type: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub cooking_time: Option<CookingTime>,
    pub servings: u32,
    pub prep_time: Option<u32>,
    pub cook_time: Option<u32>,
    pub total_time: Option<u32>,
    pub dietary_restrictions: Vec<String>,
    pub allergens: Vec<String>,
    pub calories_per_serving: Option<u32>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    /// Average of all ratings, absent until the first one
    pub rating: Option<f64>,
    pub rating_count: u32,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub source_ingredients: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_featured: bool,
    pub view_count: u64,
}

impl Recipe {
    pub(crate) fn new(id: RecipeId, new: NewRecipe, now: DateTime<Utc>) -> Self {
        Recipe {
            id,
            title: new.title,
            description: new.description,
            ingredients: new.ingredients,
            instructions: new.instructions,
            meal_type: new.meal_type,
            cuisine_type: new.cuisine_type,
            difficulty: new.difficulty,
            cooking_time: new.cooking_time,
            servings: new.servings,
            prep_time: new.prep_time,
            cook_time: new.cook_time,
            total_time: new.total_time,
            dietary_restrictions: new.dietary_restrictions,
            allergens: new.allergens,
            calories_per_serving: new.calories_per_serving,
            protein: new.protein,
            carbs: new.carbs,
            fat: new.fat,
            fiber: new.fiber,
            rating: None,
            rating_count: 0,
            tags: new.tags,
            notes: new.notes,
            source_ingredients: new.source_ingredients,
            created_at: now,
            updated_at: now,
            is_active: true,
            is_featured: new.is_featured,
            view_count: 0,
        }
    }

    /// Fold one more score into the running average.
    pub fn apply_rating(&mut self, score: u8) {
        let score = f64::from(score);
        self.rating = Some(match self.rating {
            None => {
                self.rating_count = 1;
                score
            }
            Some(average) => {
                let total = average * f64::from(self.rating_count) + score;
                self.rating_count += 1;
                total / f64::from(self.rating_count)
            }
        });
    }

    pub fn average_rating_display(&self) -> String {
        match self.rating {
            Some(rating) if rating > 0.0 => format!("{:.1}", rating),
            _ => "No ratings".to_string(),
        }
    }

    pub fn total_time_display(&self) -> String {
        match self.total_time {
            Some(total) if total > 0 => {
                let hours = total / 60;
                let minutes = total % 60;
                match (hours, minutes) {
                    (0, m) => format!("{}m", m),
                    (h, 0) => format!("{}h", h),
                    (h, m) => format!("{}h {}m", h, m),
                }
            }
            _ => "Unknown".to_string(),
        }
    }

    pub fn nutrition_summary(&self) -> Option<NutritionSummary> {
        let grams = |value: Option<f64>| {
            value
                .filter(|g| *g != 0.0)
                .map(|g| format!("{:.2}g", g))
        };

        let summary = NutritionSummary {
            calories: self.calories_per_serving.filter(|c| *c != 0),
            protein: grams(self.protein),
            carbs: grams(self.carbs),
            fat: grams(self.fat),
            fiber: grams(self.fiber),
        };

        let empty = summary.calories.is_none()
            && summary.protein.is_none()
            && summary.carbs.is_none()
            && summary.fat.is_none()
            && summary.fiber.is_none();
        (!empty).then_some(summary)
    }
}

/// A client's score for a recipe, as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingInput {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRating {
    pub id: u64,
    pub recipe_id: RecipeId,
    pub rating: u8,
    pub comment: Option<String>,
    pub user_ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one generation attempt, kept for analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGeneration {
    pub recipe_id: Option<RecipeId>,
    pub request: RecipeRequest,
    /// Wall-clock seconds from request to result
    pub generation_time: f64,
    pub model_used: String,
    pub successful: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: u64,
    #[serde(flatten)]
    pub generation: NewGeneration,
    pub created_at: DateTime<Utc>,
}

/// Storage backend for recipes, ratings and generation records.
pub trait RecipeStore: Send + Sync {
    fn insert_recipe(&self, recipe: NewRecipe) -> Result<Recipe, GeneratorError>;

    fn recipe(&self, id: RecipeId) -> Result<Option<Recipe>, GeneratorError>;

    /// All recipes, active or not, in insertion order.
    fn recipes(&self) -> Result<Vec<Recipe>, GeneratorError>;

    fn set_active(&self, id: RecipeId, active: bool) -> Result<Recipe, GeneratorError>;

    fn set_featured(&self, id: RecipeId, featured: bool) -> Result<Recipe, GeneratorError>;

    /// Increment the view counter and return the updated recipe.
    ///
    /// Inactive recipes are reported as [`GeneratorError::RecipeNotFound`].
    fn record_view(&self, id: RecipeId) -> Result<Recipe, GeneratorError>;

    /// Store a rating and fold it into the recipe's average in one step.
    ///
    /// Fails with [`GeneratorError::DuplicateRating`] if `user_ip` already rated it,
    /// and with [`GeneratorError::RecipeNotFound`] if the recipe is inactive.
    fn add_rating(
        &self,
        id: RecipeId,
        input: RatingInput,
        user_ip: Option<String>,
    ) -> Result<(RecipeRating, Recipe), GeneratorError>;

    fn ratings(&self, id: RecipeId) -> Result<Vec<RecipeRating>, GeneratorError>;

    fn record_generation(
        &self,
        generation: NewGeneration,
    ) -> Result<GenerationRecord, GeneratorError>;

    fn generations(&self) -> Result<Vec<GenerationRecord>, GeneratorError>;
}
