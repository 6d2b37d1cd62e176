use super::{
    GenerationRecord, NewGeneration, NewRecipe, RatingInput, Recipe, RecipeId, RecipeRating,
    RecipeStore,
};
use crate::error::GeneratorError;
use chrono::Utc;
use log::debug;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    recipes: Vec<Recipe>,
    ratings: Vec<RecipeRating>,
    generations: Vec<GenerationRecord>,
    next_recipe_id: u64,
    next_rating_id: u64,
    next_generation_id: u64,
}

impl Tables {
    fn recipe_mut(&mut self, id: RecipeId) -> Result<&mut Recipe, GeneratorError> {
        self.recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(GeneratorError::RecipeNotFound(id))
    }

    fn active_recipe_mut(&mut self, id: RecipeId) -> Result<&mut Recipe, GeneratorError> {
        self.recipes
            .iter_mut()
            .find(|r| r.id == id && r.is_active)
            .ok_or(GeneratorError::RecipeNotFound(id))
    }
}

/// In-process store. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, GeneratorError> {
        self.tables
            .read()
            .map_err(|e| GeneratorError::Storage(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, GeneratorError> {
        self.tables
            .write()
            .map_err(|e| GeneratorError::Storage(e.to_string()))
    }
}

impl RecipeStore for MemoryStore {
    fn insert_recipe(&self, recipe: NewRecipe) -> Result<Recipe, GeneratorError> {
        let mut tables = self.write()?;
        tables.next_recipe_id += 1;
        let recipe = Recipe::new(tables.next_recipe_id, recipe, Utc::now());
        debug!("Stored recipe {} \"{}\"", recipe.id, recipe.title);
        tables.recipes.push(recipe.clone());
        Ok(recipe)
    }

    fn recipe(&self, id: RecipeId) -> Result<Option<Recipe>, GeneratorError> {
        Ok(self.read()?.recipes.iter().find(|r| r.id == id).cloned())
    }

    fn recipes(&self) -> Result<Vec<Recipe>, GeneratorError> {
        Ok(self.read()?.recipes.clone())
    }

    fn set_active(&self, id: RecipeId, active: bool) -> Result<Recipe, GeneratorError> {
        let mut tables = self.write()?;
        let recipe = tables.recipe_mut(id)?;
        recipe.is_active = active;
        recipe.updated_at = Utc::now();
        Ok(recipe.clone())
    }

    fn set_featured(&self, id: RecipeId, featured: bool) -> Result<Recipe, GeneratorError> {
        let mut tables = self.write()?;
        let recipe = tables.recipe_mut(id)?;
        recipe.is_featured = featured;
        recipe.updated_at = Utc::now();
        Ok(recipe.clone())
    }

    fn record_view(&self, id: RecipeId) -> Result<Recipe, GeneratorError> {
        let mut tables = self.write()?;
        let recipe = tables.active_recipe_mut(id)?;
        recipe.view_count += 1;
        Ok(recipe.clone())
    }

    fn add_rating(
        &self,
        id: RecipeId,
        input: RatingInput,
        user_ip: Option<String>,
    ) -> Result<(RecipeRating, Recipe), GeneratorError> {
        let mut tables = self.write()?;

        // Existence first, so an unknown recipe is never reported as a duplicate.
        tables.active_recipe_mut(id)?;

        if user_ip.is_some()
            && tables
                .ratings
                .iter()
                .any(|r| r.recipe_id == id && r.user_ip == user_ip)
        {
            return Err(GeneratorError::DuplicateRating);
        }

        tables.next_rating_id += 1;
        let rating = RecipeRating {
            id: tables.next_rating_id,
            recipe_id: id,
            rating: input.rating,
            comment: input.comment,
            user_ip,
            created_at: Utc::now(),
        };
        tables.ratings.push(rating.clone());

        let recipe = tables.active_recipe_mut(id)?;
        recipe.apply_rating(rating.rating);
        Ok((rating, recipe.clone()))
    }

    fn ratings(&self, id: RecipeId) -> Result<Vec<RecipeRating>, GeneratorError> {
        Ok(self
            .read()?
            .ratings
            .iter()
            .filter(|r| r.recipe_id == id)
            .cloned()
            .collect())
    }

    fn record_generation(
        &self,
        generation: NewGeneration,
    ) -> Result<GenerationRecord, GeneratorError> {
        let mut tables = self.write()?;
        tables.next_generation_id += 1;
        let record = GenerationRecord {
            id: tables.next_generation_id,
            generation,
            created_at: Utc::now(),
        };
        tables.generations.push(record.clone());
        Ok(record)
    }

    fn generations(&self) -> Result<Vec<GenerationRecord>, GeneratorError> {
        Ok(self.read()?.generations.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecipeRequest;

    fn new_recipe(title: &str) -> NewRecipe {
        NewRecipe {
            title: title.to_string(),
            servings: 4,
            ..Default::default()
        }
    }

    fn rating(score: u8) -> RatingInput {
        RatingInput {
            rating: score,
            comment: None,
        }
    }

    #[test]
    fn test_ids_are_sequential() {
        let store = MemoryStore::new();
        let first = store.insert_recipe(new_recipe("One")).unwrap();
        let second = store.insert_recipe(new_recipe("Two")).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(first.is_active);
        assert!(!first.is_featured);
        assert_eq!(first.view_count, 0);
        assert_eq!(store.recipes().unwrap().len(), 2);
    }

    #[test]
    fn test_record_view_increments() {
        let store = MemoryStore::new();
        let recipe = store.insert_recipe(new_recipe("Soup")).unwrap();

        store.record_view(recipe.id).unwrap();
        let updated = store.record_view(recipe.id).unwrap();
        assert_eq!(updated.view_count, 2);
        assert!(matches!(
            store.record_view(99),
            Err(GeneratorError::RecipeNotFound(99))
        ));
    }

    #[test]
    fn test_duplicate_rating_from_same_ip() {
        let store = MemoryStore::new();
        let recipe = store.insert_recipe(new_recipe("Stew")).unwrap();
        let ip = Some("10.0.0.1".to_string());

        let (_, updated) = store.add_rating(recipe.id, rating(4), ip.clone()).unwrap();
        assert_eq!(updated.rating, Some(4.0));

        let err = store.add_rating(recipe.id, rating(1), ip).unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateRating));

        let (_, updated) = store
            .add_rating(recipe.id, rating(2), Some("10.0.0.2".to_string()))
            .unwrap();
        assert_eq!(updated.rating, Some(3.0));
        assert_eq!(updated.rating_count, 2);
        assert_eq!(store.ratings(recipe.id).unwrap().len(), 2);
    }

    #[test]
    fn test_inactive_recipe_takes_no_views_or_ratings() {
        let store = MemoryStore::new();
        let recipe = store.insert_recipe(new_recipe("Retired")).unwrap();
        store.record_view(recipe.id).unwrap();
        store.set_active(recipe.id, false).unwrap();

        assert!(matches!(
            store.record_view(recipe.id),
            Err(GeneratorError::RecipeNotFound(_))
        ));
        assert!(matches!(
            store.add_rating(recipe.id, rating(5), None),
            Err(GeneratorError::RecipeNotFound(_))
        ));

        let stored = store.recipe(recipe.id).unwrap().unwrap();
        assert_eq!(stored.view_count, 1);
        assert_eq!(stored.rating_count, 0);
        assert!(store.ratings(recipe.id).unwrap().is_empty());
    }

    #[test]
    fn test_rating_unknown_recipe() {
        let store = MemoryStore::new();
        let err = store.add_rating(7, rating(3), None).unwrap_err();
        assert!(matches!(err, GeneratorError::RecipeNotFound(7)));
    }

    #[test]
    fn test_generation_records() {
        let store = MemoryStore::new();
        let record = store
            .record_generation(NewGeneration {
                recipe_id: None,
                request: RecipeRequest::with_ingredients(["kale"]),
                generation_time: 1.5,
                model_used: "gemini-1.5-flash".into(),
                successful: false,
                error_message: Some("timeout".into()),
            })
            .unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(store.generations().unwrap(), vec![record]);
    }
}
