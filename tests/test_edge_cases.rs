use recipe_generator::extractor::DEFAULT_TITLE;
use recipe_generator::{extract, RecipeRequest};

fn run(text: &str) -> recipe_generator::ExtractedRecipe {
    extract(text, &RecipeRequest::default())
}

#[test]
fn test_non_ascii_content() {
    let text = "TITLE: Crème brûlée à l'orange 🍊\n\
                DESCRIPTION: Dessert français.\n\
                INGREDIENTS:\n• 500 ml crème fraîche\n- 4 jaunes d'œufs\n\
                INSTRUCTIONS:\n1. Préchauffer le four à 150 °C.\n\
                TAGS: dessert, français, 甜点\n";
    let recipe = run(text);

    assert_eq!(recipe.title, "Crème brûlée à l'orange 🍊");
    assert_eq!(recipe.ingredients, vec!["500 ml crème fraîche", "4 jaunes d'œufs"]);
    assert_eq!(recipe.instructions, vec!["Préchauffer le four à 150 °C."]);
    assert_eq!(recipe.tags, vec!["dessert", "français", "甜点"]);
}

#[test]
fn test_unicode_digits_are_not_minutes() {
    let recipe = run("PREP_TIME: ١٥\nCOOK_TIME: 10");
    assert_eq!(recipe.prep_time_minutes, None);
    assert_eq!(recipe.cook_time_minutes, Some(10));
}

#[test]
fn test_very_long_lines() {
    let long_step = "stir ".repeat(50_000);
    let text = format!(
        "TITLE: {}\nINSTRUCTIONS:\n1. {}\nNUTRITION_INFO:\nCalories: {}\n",
        "A".repeat(100_000),
        long_step,
        "9".repeat(5_000)
    );
    let recipe = run(&text);

    assert_eq!(recipe.title.len(), 100_000);
    assert_eq!(recipe.instructions.len(), 1);
    assert_eq!(recipe.instructions[0], long_step.trim());
    // Too large for the calorie field: dropped, nothing else affected
    assert_eq!(recipe.nutrition.calories, None);
}

#[test]
fn test_huge_gram_value_is_dropped() {
    let text = format!("NUTRITION_INFO:\nProtein: {}\nFat: 3", "9".repeat(400));
    let recipe = run(&text);
    assert_eq!(recipe.nutrition.protein, None);
    assert_eq!(recipe.nutrition.fat, Some(3.0));
}

#[test]
fn test_non_numeric_values() {
    let text = "PREP_TIME: N/A\nCOOK_TIME: twenty\nTOTAL_TIME: -5\n\
                NUTRITION_INFO:\nCalories: unknown\nProtein: lots\nCarbs: .5\n";
    let recipe = run(text);

    assert_eq!(recipe.prep_time_minutes, None);
    assert_eq!(recipe.cook_time_minutes, None);
    assert_eq!(recipe.total_time_minutes, None);
    assert!(recipe.nutrition.is_empty());
}

#[test]
fn test_windows_line_endings() {
    let text = "TITLE: Toast\r\nINGREDIENTS:\r\n- bread\r\n- butter\r\nINSTRUCTIONS:\r\n1. Toast.\r\nTAGS: easy, breakfast\r\n";
    let recipe = run(text);

    assert_eq!(recipe.title, "Toast");
    assert_eq!(recipe.ingredients, vec!["bread", "butter"]);
    assert_eq!(recipe.instructions, vec!["Toast."]);
    assert_eq!(recipe.tags, vec!["easy", "breakfast"]);
}

#[test]
fn test_marker_without_content() {
    let recipe = run("TITLE:\nDESCRIPTION:\nPREP_TIME:\nINGREDIENTS:\nINSTRUCTIONS:\nTAGS:\nNOTES:");

    assert_eq!(recipe.title, DEFAULT_TITLE);
    assert!(recipe.ingredients.is_empty());
    assert!(recipe.instructions.is_empty());
    assert!(recipe.tags.is_empty());
    assert_eq!(recipe.notes, "");
}

#[test]
fn test_lowercase_markers_are_ignored() {
    let recipe = run("title: Quiet Soup\ningredients:\n- water\n");
    assert_eq!(recipe.title, DEFAULT_TITLE);
    assert!(recipe.ingredients.is_empty());
}

#[test]
fn test_marker_word_inside_prose_splits_literally() {
    // The uppercase marker is matched anywhere, even mid-sentence.
    let text = "INGREDIENTS:\n- flour\n- see INSTRUCTIONS: below\n- sugar\nINSTRUCTIONS:\n1. Mix.";
    let recipe = run(text);

    assert_eq!(recipe.ingredients, vec!["flour", "see"]);
}

#[test]
fn test_preamble_and_markdown_around_sections() {
    let text = "Sure! Here's your recipe:\n\n**TITLE: Quick Pesto Pasta**\n\nPREP_TIME: 5 minutes\nCOOK_TIME: 12 minutes\n";
    let recipe = run(text);

    assert_eq!(recipe.title, "Quick Pesto Pasta**");
    assert_eq!(recipe.total_time_minutes, Some(17));
}
