//! Turns the free-text reply of the generation service into a structured recipe.
//!
//! Parsing never fails as a whole. Every field is computed by its own function
//! returning an `Option` (or a possibly empty list); a missing or malformed
//! section only leaves that one field at its default.

mod sections;

pub use sections::{section, Marker, SectionRule, RULES};

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::model::RecipeRequest;

pub const DEFAULT_TITLE: &str = "Personalized Recipe";
pub const DEFAULT_DESCRIPTION: &str = "A delicious recipe created just for you";

static PREP_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PREP_TIME:\s*([0-9]+)").expect("valid prep time pattern"));
static COOK_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"COOK_TIME:\s*([0-9]+)").expect("valid cook time pattern"));
static TOTAL_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TOTAL_TIME:\s*([0-9]+)").expect("valid total time pattern"));

static STEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s*(.*)$").expect("valid step pattern"));

static CALORIES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Calories:\s*([0-9]+)").expect("valid calories pattern"));
static PROTEIN_RE: LazyLock<Regex> = LazyLock::new(|| grams_pattern("Protein"));
static CARBS_RE: LazyLock<Regex> = LazyLock::new(|| grams_pattern("Carbs"));
static FAT_RE: LazyLock<Regex> = LazyLock::new(|| grams_pattern("Fat"));
static FIBER_RE: LazyLock<Regex> = LazyLock::new(|| grams_pattern("Fiber"));

fn grams_pattern(label: &str) -> Regex {
    Regex::new(&format!(r"(?i){}:\s*([0-9]+(?:\.[0-9]+)?)", label))
        .expect("valid nutrition pattern")
}

/// Per-serving nutrition values. Absent when the reply does not mention them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: Option<u32>,
    /// Grams
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
}

impl Nutrition {
    pub fn is_empty(&self) -> bool {
        self == &Nutrition::default()
    }
}

/// Structured fields recovered from one generation reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecipe {
    pub title: String,
    pub description: String,
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    pub total_time_minutes: Option<u32>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Nutrition::is_empty")]
    pub nutrition: Nutrition,
    /// Unique, in order of first appearance
    pub tags: Vec<String>,
    pub notes: String,
}

impl Default for ExtractedRecipe {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            prep_time_minutes: None,
            cook_time_minutes: None,
            total_time_minutes: None,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            nutrition: Nutrition::default(),
            tags: Vec::new(),
            notes: String::new(),
        }
    }
}

pub struct ResponseExtractor;

impl ResponseExtractor {
    /// Extract a recipe from a generation reply.
    ///
    /// The request context is accepted for symmetry with the rest of the
    /// workflow; parsed fields never override it and it is not consulted for
    /// any parsed value.
    pub fn extract(raw_text: &str, context: &RecipeRequest) -> ExtractedRecipe {
        debug!(
            "Extracting recipe from {} byte response ({} servings requested)",
            raw_text.len(),
            context.servings
        );

        let prep_time_minutes = parse_minutes(raw_text, &PREP_TIME_RE);
        let cook_time_minutes = parse_minutes(raw_text, &COOK_TIME_RE);
        let total_time_minutes = parse_minutes(raw_text, &TOTAL_TIME_RE).or_else(|| {
            prep_time_minutes
                .zip(cook_time_minutes)
                .and_then(|(prep, cook)| prep.checked_add(cook))
        });

        let recipe = ExtractedRecipe {
            title: parse_title(raw_text).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description: parse_description(raw_text)
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            prep_time_minutes,
            cook_time_minutes,
            total_time_minutes,
            ingredients: parse_ingredients(raw_text),
            instructions: parse_instructions(raw_text),
            nutrition: parse_nutrition(raw_text),
            tags: parse_tags(raw_text),
            notes: parse_notes(raw_text).unwrap_or_default(),
        };

        debug!(
            "Extracted \"{}\": {} ingredients, {} steps, {} tags",
            recipe.title,
            recipe.ingredients.len(),
            recipe.instructions.len(),
            recipe.tags.len()
        );

        recipe
    }
}

/// Shorthand for [`ResponseExtractor::extract`].
pub fn extract(raw_text: &str, context: &RecipeRequest) -> ExtractedRecipe {
    ResponseExtractor::extract(raw_text, context)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_title(text: &str) -> Option<String> {
    section(text, Marker::Title)?.lines().next().and_then(non_empty)
}

fn parse_description(text: &str) -> Option<String> {
    section(text, Marker::Description).and_then(non_empty)
}

/// First run of digits right after the marker. Values that overflow are dropped.
fn parse_minutes(text: &str, pattern: &Regex) -> Option<u32> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn parse_ingredients(text: &str) -> Vec<String> {
    let Some(body) = section(text, Marker::Ingredients) else {
        return Vec::new();
    };

    body.lines()
        .map(str::trim)
        .filter(|line| line.starts_with(['-', '•']))
        .filter_map(|line| non_empty(line.trim_start_matches(['-', '•'])))
        .collect()
}

fn parse_instructions(text: &str) -> Vec<String> {
    let Some(body) = section(text, Marker::Instructions) else {
        return Vec::new();
    };

    body.lines()
        .map(str::trim)
        .filter_map(|line| STEP_RE.captures(line))
        .filter_map(|caps| caps.get(1).and_then(|step| non_empty(step.as_str())))
        .collect()
}

fn parse_nutrition(text: &str) -> Nutrition {
    let Some(body) = section(text, Marker::NutritionInfo) else {
        return Nutrition::default();
    };

    Nutrition {
        calories: first_capture(body, &CALORIES_RE).and_then(|v| v.parse().ok()),
        protein: parse_grams(body, &PROTEIN_RE),
        carbs: parse_grams(body, &CARBS_RE),
        fat: parse_grams(body, &FAT_RE),
        fiber: parse_grams(body, &FIBER_RE),
    }
}

fn first_capture<'t>(text: &'t str, pattern: &Regex) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn parse_grams(text: &str, pattern: &Regex) -> Option<f64> {
    first_capture(text, pattern)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|grams| grams.is_finite())
}

fn parse_tags(text: &str) -> Vec<String> {
    let Some(line) = section(text, Marker::Tags).and_then(|body| body.lines().next()) else {
        return Vec::new();
    };

    let mut tags: Vec<String> = Vec::new();
    for tag in line.split(',').filter_map(non_empty) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

fn parse_notes(text: &str) -> Option<String> {
    section(text, Marker::Notes).and_then(non_empty)
}
