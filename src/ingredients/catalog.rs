//! Built-in catalog data and the two matching strategies: the client-side
//! multi-term filter and the server-side text ranking.

use tracing::info;

use super::model::{Ingredient, IngredientRef, NewIngredient, NutritionalInfo};
use crate::error::DatabaseError;
use crate::store::Database;

/// Catalog shown by the selector when the backend can't be reached.
pub fn fallback_catalog() -> Vec<IngredientRef> {
    vec![
        IngredientRef::new("1", "Chicken Breast", &["Protein", "Meat"], &["high-protein", "low-carb"]),
        IngredientRef::new("2", "Salmon", &["Protein", "Fish"], &["high-protein", "omega-3"]),
        IngredientRef::new("3", "Quinoa", &["Grains"], &["vegetarian", "gluten-free"]),
        IngredientRef::new("4", "Sweet Potato", &["Vegetables"], &["vegetarian", "complex-carbs"]),
        IngredientRef::new("5", "Avocado", &["Fruits", "Healthy Fats"], &["vegetarian", "healthy-fats"]),
        IngredientRef::new("6", "Spinach", &["Vegetables", "Leafy Greens"], &["vegetarian", "low-calorie"]),
        IngredientRef::new("7", "Greek Yogurt", &["Dairy", "Protein"], &["high-protein", "probiotic"]),
        IngredientRef::new("8", "Almonds", &["Nuts", "Healthy Fats"], &["vegetarian", "healthy-fats"]),
    ]
}

fn seed(
    name: &str,
    category: &[&str],
    (calories, protein, carbs, fat): (f64, f64, f64, f64),
    fiber: Option<f64>,
    dietary_categories: &[&str],
) -> NewIngredient {
    NewIngredient {
        name: name.to_string(),
        category: category.iter().map(|s| s.to_string()).collect(),
        nutritional_info: NutritionalInfo {
            calories,
            protein,
            carbs,
            fat,
            fiber,
            ..Default::default()
        },
        dietary_categories: dietary_categories.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

/// Records loaded into an empty database.
pub fn seed_ingredients() -> Vec<NewIngredient> {
    vec![
        seed("Chicken Breast", &["Protein", "Meat"], (165.0, 31.0, 0.0, 3.6), None, &["high-protein", "low-carb"]),
        seed("Quinoa", &["Grains", "Plant-Based"], (120.0, 4.4, 21.3, 1.9), Some(2.8), &["vegetarian", "vegan", "gluten-free"]),
        seed("Sweet Potato", &["Vegetables", "Starchy Vegetables"], (103.0, 2.0, 23.6, 0.2), Some(3.8), &["vegetarian", "vegan", "paleo"]),
        seed("Salmon", &["Protein", "Fish"], (208.0, 22.0, 0.0, 13.0), None, &["pescatarian", "keto", "high-protein"]),
        seed("Avocado", &["Fruits", "Healthy Fats"], (160.0, 2.0, 8.5, 14.7), Some(6.7), &["vegetarian", "vegan", "keto"]),
    ]
}

/// Load the seed records. With `replace`, the existing catalog is wiped
/// first; otherwise seeding only happens when the catalog is empty.
pub async fn seed_catalog(db: &dyn Database, replace: bool) -> Result<usize, DatabaseError> {
    if replace {
        let removed = db.delete_all_ingredients().await?;
        info!(removed, "Cleared ingredient catalog");
    } else if db.count_ingredients().await? > 0 {
        return Ok(0);
    }

    let records = seed_ingredients();
    for record in &records {
        db.create_ingredient(record).await?;
    }
    info!(count = records.len(), "Seeded ingredient catalog");
    Ok(records.len())
}

fn terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Case-insensitive multi-term AND match against name and categories.
///
/// A blank query returns everything.
pub fn filter(catalog: &[IngredientRef], query: &str) -> Vec<IngredientRef> {
    let terms = terms(query);
    if terms.is_empty() {
        return catalog.to_vec();
    }

    catalog
        .iter()
        .filter(|ingredient| {
            let name = ingredient.name.to_lowercase();
            let categories = ingredient
                .categories
                .iter()
                .map(|c| c.to_lowercase())
                .collect::<Vec<_>>()
                .join(" ");
            terms
                .iter()
                .all(|term| name.contains(term.as_str()) || categories.contains(term.as_str()))
        })
        .cloned()
        .collect()
}

/// Text score for one document: 2 per term in the name, 1 per term in a category.
fn score(ingredient: &Ingredient, terms: &[String]) -> u32 {
    let name = ingredient.name.to_lowercase();
    let categories: Vec<String> = ingredient.category.iter().map(|c| c.to_lowercase()).collect();
    terms
        .iter()
        .map(|term| {
            let mut s = 0;
            if name.contains(term.as_str()) {
                s += 2;
            }
            if categories.iter().any(|c| c.contains(term.as_str())) {
                s += 1;
            }
            s
        })
        .sum()
}

/// Documents matching any query term, best score first, ties by name.
pub fn rank(ingredients: Vec<Ingredient>, query: &str) -> Vec<Ingredient> {
    let terms = terms(query);
    let mut scored: Vec<(u32, Ingredient)> = ingredients
        .into_iter()
        .map(|i| (score(&i, &terms), i))
        .filter(|(s, _)| *s > 0)
        .collect();
    scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| a.name.cmp(&b.name)));
    scored.into_iter().map(|(_, i)| i).collect()
}
