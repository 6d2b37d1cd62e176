//! Read-side queries over stored recipes: search, detail, ratings and stats.
//!
//! Only active recipes are visible here.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::error::GeneratorError;
use crate::model::{CookingTime, Difficulty, MealType};
use crate::store::{RatingInput, Recipe, RecipeId, RecipeRating, RecipeStore};

const DEFAULT_CLIENT_IP: &str = "127.0.0.1";
const TOP_CUISINES: usize = 5;

/// Sort order for search results. `-` prefix in the string form means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "created_at")]
    Oldest,
    #[default]
    #[serde(rename = "-created_at")]
    Newest,
    #[serde(rename = "rating")]
    LowestRated,
    #[serde(rename = "-rating")]
    HighestRated,
    #[serde(rename = "view_count")]
    LeastViewed,
    #[serde(rename = "-view_count")]
    MostViewed,
    #[serde(rename = "title")]
    TitleAsc,
    #[serde(rename = "-title")]
    TitleDesc,
}

impl FromStr for SortOrder {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortOrder::Oldest),
            "-created_at" => Ok(SortOrder::Newest),
            "rating" => Ok(SortOrder::LowestRated),
            "-rating" => Ok(SortOrder::HighestRated),
            "view_count" => Ok(SortOrder::LeastViewed),
            "-view_count" => Ok(SortOrder::MostViewed),
            "title" => Ok(SortOrder::TitleAsc),
            "-title" => Ok(SortOrder::TitleDesc),
            other => Err(GeneratorError::validation(
                "ordering",
                format!("\"{}\" is not a valid choice.", other),
            )),
        }
    }
}

impl SortOrder {
    fn compare(self, a: &Recipe, b: &Recipe) -> Ordering {
        // Absent ratings sort below any present rating.
        let by_created = a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id));
        match self {
            SortOrder::Oldest => by_created,
            SortOrder::Newest => by_created.reverse(),
            SortOrder::LowestRated => cmp_rating(a, b),
            SortOrder::HighestRated => cmp_rating(a, b).reverse(),
            SortOrder::LeastViewed => a.view_count.cmp(&b.view_count),
            SortOrder::MostViewed => b.view_count.cmp(&a.view_count),
            SortOrder::TitleAsc => a.title.cmp(&b.title),
            SortOrder::TitleDesc => b.title.cmp(&a.title),
        }
    }
}

fn cmp_rating(a: &Recipe, b: &Recipe) -> Ordering {
    match (a.rating, b.rating) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Search filters. Unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Matched against title, description and ingredients
    pub query: Option<String>,
    pub meal_type: Option<MealType>,
    pub cuisine_type: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub cooking_time: Option<CookingTime>,
    pub dietary_restrictions: Vec<String>,
    pub min_rating: Option<f64>,
    pub max_servings: Option<u32>,
    pub ordering: SortOrder,
}

impl SearchParams {
    fn validate(&self) -> Result<(), GeneratorError> {
        if let Some(min_rating) = self.min_rating {
            if !(0.0..=5.0).contains(&min_rating) {
                return Err(GeneratorError::validation(
                    "min_rating",
                    "Ensure this value is between 0 and 5.",
                ));
            }
        }
        if let Some(max_servings) = self.max_servings {
            if !(1..=20).contains(&max_servings) {
                return Err(GeneratorError::validation(
                    "max_servings",
                    "Ensure this value is between 1 and 20.",
                ));
            }
        }
        Ok(())
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        if let Some(query) = non_blank(&self.query) {
            let in_title = contains_ci(&recipe.title, &query);
            let in_description = recipe
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, &query));
            let in_ingredients = recipe.ingredients.iter().any(|i| contains_ci(i, &query));
            if !(in_title || in_description || in_ingredients) {
                return false;
            }
        }

        if self.meal_type.is_some() && recipe.meal_type != self.meal_type {
            return false;
        }
        if self.difficulty.is_some() && recipe.difficulty != self.difficulty {
            return false;
        }
        if self.cooking_time.is_some() && recipe.cooking_time != self.cooking_time {
            return false;
        }

        if let Some(cuisine) = non_blank(&self.cuisine_type) {
            if !recipe
                .cuisine_type
                .as_deref()
                .is_some_and(|c| contains_ci(c, &cuisine))
            {
                return false;
            }
        }

        if let Some(min_rating) = self.min_rating.filter(|r| *r > 0.0) {
            if !recipe.rating.is_some_and(|r| r >= min_rating) {
                return false;
            }
        }

        if let Some(max_servings) = self.max_servings {
            if recipe.servings > max_servings {
                return false;
            }
        }

        self.dietary_restrictions
            .iter()
            .filter(|r| !r.trim().is_empty())
            .all(|restriction| {
                recipe
                    .dietary_restrictions
                    .iter()
                    .any(|r| contains_ci(r, restriction.trim()))
            })
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Total number of matches across all pages
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingOutcome {
    pub rating: RecipeRating,
    pub new_average: f64,
    pub total_ratings: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuisineCount {
    pub cuisine_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_recipes: usize,
    pub total_views: u64,
    pub average_rating: f64,
    pub popular_cuisines: Vec<CuisineCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestions {
    pub suggestions: Vec<Recipe>,
    pub search_ingredients: Vec<String>,
}

pub struct Catalog {
    store: Arc<dyn RecipeStore>,
    config: CatalogConfig,
}

impl Catalog {
    pub fn new(store: Arc<dyn RecipeStore>, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    fn active(&self) -> Result<Vec<Recipe>, GeneratorError> {
        Ok(self
            .store
            .recipes()?
            .into_iter()
            .filter(|r| r.is_active)
            .collect())
    }

    fn active_recipe(&self, id: RecipeId) -> Result<Recipe, GeneratorError> {
        self.store
            .recipe(id)?
            .filter(|r| r.is_active)
            .ok_or(GeneratorError::RecipeNotFound(id))
    }

    /// Filter, order and paginate active recipes.
    ///
    /// `page` is 1-based. `page_size` falls back to the configured default and
    /// is capped at the configured maximum.
    pub fn search(
        &self,
        params: &SearchParams,
        page: usize,
        page_size: Option<usize>,
    ) -> Result<Page<Recipe>, GeneratorError> {
        params.validate()?;

        let page_size = page_size
            .filter(|size| *size > 0)
            .unwrap_or(self.config.page_size)
            .min(self.config.max_page_size)
            .max(1);

        let mut matches: Vec<Recipe> = self
            .active()?
            .into_iter()
            .filter(|r| params.matches(r))
            .collect();
        matches.sort_by(|a, b| params.ordering.compare(a, b));

        let count = matches.len();
        let last_page = count.div_ceil(page_size).max(1);
        if page == 0 || page > last_page {
            return Err(GeneratorError::InvalidPage(page));
        }

        let results: Vec<Recipe> = matches
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();
        debug!(
            "Search matched {} recipes, returning page {}/{}",
            count, page, last_page
        );

        Ok(Page {
            count,
            page,
            page_size,
            has_next: page < last_page,
            has_previous: page > 1,
            results,
        })
    }

    /// Fetch one recipe and count the view.
    pub fn detail(&self, id: RecipeId) -> Result<Recipe, GeneratorError> {
        self.store.record_view(id)
    }

    pub fn rate(
        &self,
        id: RecipeId,
        input: RatingInput,
        client_ip: Option<&str>,
    ) -> Result<RatingOutcome, GeneratorError> {
        self.active_recipe(id)?;

        if !(1..=5).contains(&input.rating) {
            return Err(GeneratorError::validation(
                "rating",
                "Rating must be between 1 and 5.",
            ));
        }

        let client_ip = client_ip
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .unwrap_or(DEFAULT_CLIENT_IP);

        let (rating, recipe) = self
            .store
            .add_rating(id, input, Some(client_ip.to_string()))?;
        info!(
            "Recipe {} rated {} by {} (average {:.2} over {})",
            id,
            rating.rating,
            client_ip,
            recipe.rating.unwrap_or_default(),
            recipe.rating_count
        );

        Ok(RatingOutcome {
            rating,
            new_average: recipe.rating.unwrap_or_default(),
            total_ratings: recipe.rating_count,
        })
    }

    /// Ratings of one recipe, newest first.
    pub fn reviews(&self, id: RecipeId) -> Result<Vec<RecipeRating>, GeneratorError> {
        self.active_recipe(id)?;
        let mut reviews = self.store.ratings(id)?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reviews)
    }

    /// Most viewed recipes with at least one view, ties broken by rating.
    pub fn popular(&self, limit: Option<usize>) -> Result<Vec<Recipe>, GeneratorError> {
        let limit = limit.unwrap_or(self.config.popular_limit);
        let mut recipes: Vec<Recipe> = self
            .active()?
            .into_iter()
            .filter(|r| r.view_count > 0)
            .collect();
        recipes.sort_by(|a, b| {
            b.view_count
                .cmp(&a.view_count)
                .then_with(|| cmp_rating(b, a))
        });
        recipes.truncate(limit);
        Ok(recipes)
    }

    pub fn featured(&self) -> Result<Vec<Recipe>, GeneratorError> {
        let mut recipes: Vec<Recipe> = self
            .active()?
            .into_iter()
            .filter(|r| r.is_featured)
            .collect();
        recipes.sort_by(|a, b| SortOrder::Newest.compare(a, b));
        recipes.truncate(self.config.featured_limit);
        Ok(recipes)
    }

    pub fn stats(&self) -> Result<CatalogStats, GeneratorError> {
        let recipes = self.active()?;

        let ratings: Vec<f64> = recipes.iter().filter_map(|r| r.rating).collect();
        let average_rating = if ratings.is_empty() {
            0.0
        } else {
            let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
            (mean * 100.0).round() / 100.0
        };

        let mut cuisines: HashMap<&str, usize> = HashMap::new();
        for cuisine in recipes.iter().filter_map(|r| r.cuisine_type.as_deref()) {
            *cuisines.entry(cuisine).or_default() += 1;
        }
        let mut popular_cuisines: Vec<CuisineCount> = cuisines
            .into_iter()
            .map(|(cuisine_type, count)| CuisineCount {
                cuisine_type: cuisine_type.to_string(),
                count,
            })
            .collect();
        popular_cuisines.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.cuisine_type.cmp(&b.cuisine_type))
        });
        popular_cuisines.truncate(TOP_CUISINES);

        Ok(CatalogStats {
            total_recipes: recipes.len(),
            total_views: recipes.iter().map(|r| r.view_count).sum(),
            average_rating,
            popular_cuisines,
        })
    }

    /// Recipes whose ingredient list mentions every comma-separated term.
    pub fn suggestions(&self, ingredients: &str) -> Result<Suggestions, GeneratorError> {
        let terms: Vec<String> = ingredients
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        if terms.is_empty() {
            return Err(GeneratorError::validation(
                "ingredients",
                "Please provide ingredients",
            ));
        }

        let mut recipes: Vec<Recipe> = self
            .active()?
            .into_iter()
            .filter(|r| {
                terms
                    .iter()
                    .all(|term| r.ingredients.iter().any(|i| contains_ci(i, term)))
            })
            .collect();
        recipes.sort_by(|a, b| {
            cmp_rating(b, a).then_with(|| b.view_count.cmp(&a.view_count))
        });
        recipes.truncate(self.config.suggestion_limit);

        Ok(Suggestions {
            suggestions: recipes,
            search_ingredients: terms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NewRecipe};

    fn catalog_with(recipes: Vec<NewRecipe>) -> (Catalog, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        for recipe in recipes {
            store.insert_recipe(recipe).unwrap();
        }
        (
            Catalog::new(store.clone(), CatalogConfig::default()),
            store,
        )
    }

    fn recipe(title: &str) -> NewRecipe {
        NewRecipe {
            title: title.to_string(),
            servings: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("-rating".parse::<SortOrder>().unwrap(), SortOrder::HighestRated);
        assert_eq!(SortOrder::default(), SortOrder::Newest);
        assert!("price".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_absent_rating_sorts_lowest() {
        let (catalog, store) = catalog_with(vec![recipe("Unrated"), recipe("Rated")]);
        store
            .add_rating(2, RatingInput { rating: 1, comment: None }, None)
            .unwrap();

        let params = SearchParams {
            ordering: SortOrder::LowestRated,
            ..Default::default()
        };
        let page = catalog.search(&params, 1, None).unwrap();
        let titles: Vec<&str> = page.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Unrated", "Rated"]);
    }

    #[test]
    fn test_page_size_is_capped() {
        let (catalog, _) = catalog_with((0..60).map(|i| recipe(&format!("R{i}"))).collect());

        let page = catalog.search(&SearchParams::default(), 1, Some(500)).unwrap();
        assert_eq!(page.page_size, 50);
        assert_eq!(page.results.len(), 50);
        assert_eq!(page.count, 60);
        assert!(page.has_next);
    }

    #[test]
    fn test_empty_catalog_has_first_page() {
        let (catalog, _) = catalog_with(Vec::new());
        let page = catalog.search(&SearchParams::default(), 1, None).unwrap();
        assert_eq!(page.count, 0);
        assert!(!page.has_next);
        assert!(matches!(
            catalog.search(&SearchParams::default(), 2, None),
            Err(GeneratorError::InvalidPage(2))
        ));
    }

    #[test]
    fn test_search_params_validation() {
        let (catalog, _) = catalog_with(Vec::new());
        let params = SearchParams {
            min_rating: Some(6.0),
            ..Default::default()
        };
        assert!(catalog.search(&params, 1, None).is_err());
    }

    #[test]
    fn test_rating_out_of_range() {
        let (catalog, _) = catalog_with(vec![recipe("Tart")]);
        let err = catalog
            .rate(1, RatingInput { rating: 6, comment: None }, None)
            .unwrap_err();
        assert!(err.to_string().contains("between 1 and 5"));
    }

    #[test]
    fn test_inactive_recipe_is_hidden() {
        let (catalog, store) = catalog_with(vec![recipe("Hidden")]);
        store.set_active(1, false).unwrap();

        assert!(matches!(
            catalog.detail(1),
            Err(GeneratorError::RecipeNotFound(1))
        ));
        assert_eq!(catalog.stats().unwrap().total_recipes, 0);
    }

    #[test]
    fn test_deactivated_recipe_stops_counting_views() {
        let (catalog, store) = catalog_with(vec![recipe("Seasonal")]);
        assert_eq!(catalog.detail(1).unwrap().view_count, 1);

        store.set_active(1, false).unwrap();
        assert!(catalog.detail(1).is_err());
        assert_eq!(store.recipe(1).unwrap().unwrap().view_count, 1);
    }
}
