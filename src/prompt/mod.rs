use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::model::RecipeRequest;

/// The prompt template sent to the generation service.
///
/// Loaded from `prompt.txt` at compile time. Contains `{{PLACEHOLDER}}`
/// slots for every request parameter; the section layout it asks for is the
/// one [`crate::extractor`] knows how to read back.
pub const RECIPE_PROMPT: &str = include_str!("prompt.txt");

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Z_]+)\}\}").expect("valid placeholder pattern"));

fn join_or(values: &[String], fallback: &str) -> String {
    let values: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        fallback.to_string()
    } else {
        values.join(", ")
    }
}

/// Fills the template with the caller's parameters.
///
/// Slots are substituted in one pass, so caller text that happens to contain
/// `{{...}}` is never expanded.
pub fn build_prompt(request: &RecipeRequest) -> String {
    let text_or = |value: &Option<String>, fallback: &str| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    PLACEHOLDER_RE
        .replace_all(RECIPE_PROMPT, |caps: &Captures| match &caps[1] {
            "INGREDIENTS" => join_or(&request.available_ingredients, ""),
            "DIETARY" => join_or(&request.dietary_restrictions, "none"),
            "CUISINES" => join_or(&request.preferred_cuisines, "any"),
            "MEAL_TYPE" => request.meal_type.map_or("any", |m| m.as_str()).to_string(),
            "COOKING_TIME" => request
                .cooking_time
                .map_or("flexible", |c| c.label())
                .to_string(),
            "DIFFICULTY" => request.difficulty.map_or("any", |d| d.as_str()).to_string(),
            "SERVINGS" => request.servings.to_string(),
            "EXCLUDE" => join_or(&request.exclude_ingredients, "none"),
            "FLAVOR" => text_or(&request.flavor_profile, "balanced"),
            "METHOD" => text_or(&request.cooking_method, "any"),
            "SPECIAL" => text_or(&request.special_requests, "none"),
            _ => caps[0].to_string(),
        })
        .into_owned()
}
