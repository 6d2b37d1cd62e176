use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GeneratorError;

const MAX_LIST_ENTRY_LEN: usize = 100;
const MAX_SHORT_TEXT_LEN: usize = 100;
const MAX_SPECIAL_REQUESTS_LEN: usize = 500;

pub const MIN_SERVINGS: u32 = 1;
pub const MAX_SERVINGS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Dessert,
    Appetizer,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
            MealType::Dessert => "dessert",
            MealType::Appetizer => "appetizer",
        }
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            "dessert" => Ok(MealType::Dessert),
            "appetizer" => Ok(MealType::Appetizer),
            other => Err(format!("\"{}\" is not a valid meal type", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("\"{}\" is not a valid difficulty", other)),
        }
    }
}

/// Coarse cooking-time bucket chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CookingTime {
    #[serde(rename = "under_15")]
    Under15,
    #[serde(rename = "15_30")]
    From15To30,
    #[serde(rename = "30_60")]
    From30To60,
    #[serde(rename = "60_120")]
    From60To120,
    #[serde(rename = "over_120")]
    Over120,
}

impl CookingTime {
    pub fn as_str(&self) -> &'static str {
        match self {
            CookingTime::Under15 => "under_15",
            CookingTime::From15To30 => "15_30",
            CookingTime::From30To60 => "30_60",
            CookingTime::From60To120 => "60_120",
            CookingTime::Over120 => "over_120",
        }
    }

    /// Human-readable label, also used in the generation prompt
    pub fn label(&self) -> &'static str {
        match self {
            CookingTime::Under15 => "Under 15 min",
            CookingTime::From15To30 => "15-30 min",
            CookingTime::From30To60 => "30-60 min",
            CookingTime::From60To120 => "1-2 hours",
            CookingTime::Over120 => "2+ hours",
        }
    }
}

impl FromStr for CookingTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "under_15" => Ok(CookingTime::Under15),
            "15_30" => Ok(CookingTime::From15To30),
            "30_60" => Ok(CookingTime::From30To60),
            "60_120" => Ok(CookingTime::From60To120),
            "over_120" => Ok(CookingTime::Over120),
            other => Err(format!("\"{}\" is not a valid cooking time", other)),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(MealType, Difficulty, CookingTime);

/// Structured parameters supplied by the caller when asking for a recipe.
///
/// The same record is echoed to the extractor and copied onto the stored
/// recipe, where it is never overwritten by parsed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRequest {
    pub available_ingredients: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub preferred_cuisines: Vec<String>,
    #[serde(default)]
    pub exclude_ingredients: Vec<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub meal_type: Option<MealType>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub cooking_time: Option<CookingTime>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub flavor_profile: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub cooking_method: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub special_requests: Option<String>,
}

fn default_servings() -> u32 {
    4
}

impl Default for RecipeRequest {
    fn default() -> Self {
        Self {
            available_ingredients: Vec::new(),
            dietary_restrictions: Vec::new(),
            preferred_cuisines: Vec::new(),
            exclude_ingredients: Vec::new(),
            meal_type: None,
            cooking_time: None,
            difficulty: None,
            servings: default_servings(),
            flavor_profile: None,
            cooking_method: None,
            special_requests: None,
        }
    }
}

impl RecipeRequest {
    /// Convenience constructor for the one required field
    pub fn with_ingredients<I, S>(ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available_ingredients: ingredients.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Check the request against the limits the generation workflow accepts.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self
            .available_ingredients
            .iter()
            .all(|ingredient| ingredient.trim().is_empty())
        {
            return Err(GeneratorError::validation(
                "available_ingredients",
                "At least one ingredient must be provided.",
            ));
        }

        if !(MIN_SERVINGS..=MAX_SERVINGS).contains(&self.servings) {
            return Err(GeneratorError::validation(
                "servings",
                "Servings must be between 1 and 20.",
            ));
        }

        let lists = [
            ("available_ingredients", &self.available_ingredients),
            ("dietary_restrictions", &self.dietary_restrictions),
            ("preferred_cuisines", &self.preferred_cuisines),
            ("exclude_ingredients", &self.exclude_ingredients),
        ];
        for (field, entries) in lists {
            if let Some(entry) = entries
                .iter()
                .find(|entry| entry.chars().count() > MAX_LIST_ENTRY_LEN)
            {
                return Err(GeneratorError::validation(
                    field,
                    format!(
                        "\"{}...\" exceeds {} characters",
                        entry.chars().take(20).collect::<String>(),
                        MAX_LIST_ENTRY_LEN
                    ),
                ));
            }
        }

        let texts = [
            ("flavor_profile", &self.flavor_profile, MAX_SHORT_TEXT_LEN),
            ("cooking_method", &self.cooking_method, MAX_SHORT_TEXT_LEN),
            (
                "special_requests",
                &self.special_requests,
                MAX_SPECIAL_REQUESTS_LEN,
            ),
        ];
        for (field, value, limit) in texts {
            if value.as_deref().is_some_and(|v| v.chars().count() > limit) {
                return Err(GeneratorError::validation(
                    field,
                    format!("Ensure this field has no more than {} characters.", limit),
                ));
            }
        }

        Ok(())
    }
}

/// Treats a missing, null or blank string as `None`, otherwise parses it.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}
