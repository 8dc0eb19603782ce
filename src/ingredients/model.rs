//! Ingredient documents and the lightweight reference the onboarding draft keeps.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-100g nutrition facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionalInfo {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamins: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minerals: Option<BTreeMap<String, f64>>,
}

/// A stored catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub name: String,
    pub category: Vec<String>,
    pub nutritional_info: NutritionalInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seasonality: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub common_allergies: Vec<String>,
    pub dietary_categories: Vec<String>,
    /// Ids of ingredients that can stand in for this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub substitutes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/ingredients`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIngredient {
    pub name: String,
    #[serde(default)]
    pub category: Vec<String>,
    pub nutritional_info: NutritionalInfo,
    #[serde(default)]
    pub seasonality: Vec<String>,
    #[serde(default)]
    pub common_allergies: Vec<String>,
    #[serde(default)]
    pub dietary_categories: Vec<String>,
    #[serde(default)]
    pub substitutes: Vec<String>,
}

impl NewIngredient {
    /// Returns a message describing the first invalid field, if any.
    pub fn validate(&self) -> Result<(), String> {
        check_name(&self.name)?;
        check_categories(&self.category)?;
        check_nutrition(&self.nutritional_info)
    }
}

/// Body of `PUT /api/ingredients/{id}`. Only the fields present are changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<Vec<String>>,
    #[serde(default)]
    pub nutritional_info: Option<NutritionalInfo>,
    #[serde(default)]
    pub seasonality: Option<Vec<String>>,
    #[serde(default)]
    pub common_allergies: Option<Vec<String>>,
    #[serde(default)]
    pub dietary_categories: Option<Vec<String>>,
    #[serde(default)]
    pub substitutes: Option<Vec<String>>,
}

impl IngredientPatch {
    /// Same rules as [`NewIngredient::validate`], applied to present fields.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(category) = &self.category {
            check_categories(category)?;
        }
        if let Some(info) = &self.nutritional_info {
            check_nutrition(info)?;
        }
        Ok(())
    }

    /// The full field set after applying this patch over `current`.
    pub fn merge_into(&self, current: &Ingredient) -> NewIngredient {
        let pick = |patch: &Option<Vec<String>>, stored: &Vec<String>| {
            patch.clone().unwrap_or_else(|| stored.clone())
        };
        NewIngredient {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            category: pick(&self.category, &current.category),
            nutritional_info: self
                .nutritional_info
                .clone()
                .unwrap_or_else(|| current.nutritional_info.clone()),
            seasonality: pick(&self.seasonality, &current.seasonality),
            common_allergies: pick(&self.common_allergies, &current.common_allergies),
            dietary_categories: pick(&self.dietary_categories, &current.dietary_categories),
            substitutes: pick(&self.substitutes, &current.substitutes),
        }
    }
}

fn check_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Ingredient name is required".to_string());
    }
    Ok(())
}

fn check_categories(category: &[String]) -> Result<(), String> {
    if category.iter().any(|c| c.trim().is_empty()) {
        return Err("Ingredient categories must not be blank".to_string());
    }
    Ok(())
}

fn check_nutrition(info: &NutritionalInfo) -> Result<(), String> {
    if [info.calories, info.protein, info.carbs, info.fat]
        .iter()
        .any(|v| !v.is_finite() || *v < 0.0)
    {
        return Err("Nutritional values must be non-negative numbers".to_string());
    }
    Ok(())
}

/// A copy of the catalog fields the onboarding draft needs.
///
/// Deserializes directly from a full [`Ingredient`] document; extra fields
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRef {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "category", default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub dietary_categories: BTreeSet<String>,
}

impl IngredientRef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        categories: &[&str],
        dietary_categories: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            dietary_categories: dietary_categories.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl From<&Ingredient> for IngredientRef {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ingredient.id.to_string(),
            name: ingredient.name.clone(),
            categories: ingredient.category.iter().cloned().collect(),
            dietary_categories: ingredient.dietary_categories.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ingredient {
        let now = Utc::now();
        Ingredient {
            id: Uuid::new_v4(),
            name: "Quinoa".to_string(),
            category: vec!["Grains".to_string(), "Plant-Based".to_string()],
            nutritional_info: NutritionalInfo {
                calories: 120.0,
                protein: 4.4,
                carbs: 21.3,
                fat: 1.9,
                fiber: Some(2.8),
                ..Default::default()
            },
            seasonality: Vec::new(),
            common_allergies: Vec::new(),
            dietary_categories: vec!["vegan".to_string(), "gluten-free".to_string()],
            substitutes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn ingredient_wire_shape_is_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["nutritionalInfo"]["fiber"], 2.8);
        assert_eq!(json["dietaryCategories"][0], "vegan");
        assert!(json.get("seasonality").is_none());
        assert!(json["nutritionalInfo"].get("vitamins").is_none());
    }

    #[test]
    fn ref_deserializes_from_full_document() {
        let doc = sample();
        let json = serde_json::to_string(&doc).unwrap();
        let r: IngredientRef = serde_json::from_str(&json).unwrap();
        assert_eq!(r.id, doc.id.to_string());
        assert_eq!(r.name, "Quinoa");
        assert!(r.categories.contains("Plant-Based"));
        assert!(r.dietary_categories.contains("gluten-free"));
        assert_eq!(r, IngredientRef::from(&doc));
    }

    #[test]
    fn ref_accepts_underscore_id() {
        let r: IngredientRef = serde_json::from_str(
            r#"{"_id":"1","name":"Salmon","category":["Protein","Fish"],"dietaryCategories":[]}"#,
        )
        .unwrap();
        assert_eq!(r.id, "1");
        assert_eq!(r.categories.len(), 2);
    }

    #[test]
    fn new_ingredient_validation() {
        let mut new = NewIngredient {
            name: "Tofu".to_string(),
            category: vec!["Protein".to_string()],
            ..Default::default()
        };
        assert!(new.validate().is_ok());

        new.name = "  ".to_string();
        assert_eq!(new.validate().unwrap_err(), "Ingredient name is required");

        new.name = "Tofu".to_string();
        new.nutritional_info.fat = -1.0;
        assert!(new.validate().is_err());
    }

    #[test]
    fn patch_keeps_fields_it_does_not_name() {
        let current = sample();
        let patch: IngredientPatch =
            serde_json::from_str(r#"{"name":"Red Quinoa","seasonality":["autumn"]}"#).unwrap();
        assert!(patch.validate().is_ok());

        let merged = patch.merge_into(&current);
        assert_eq!(merged.name, "Red Quinoa");
        assert_eq!(merged.seasonality, vec!["autumn"]);
        assert_eq!(merged.category, current.category);
        assert_eq!(merged.dietary_categories, current.dietary_categories);
        assert_eq!(merged.nutritional_info, current.nutritional_info);
    }

    #[test]
    fn patch_validates_present_fields_only() {
        assert!(IngredientPatch::default().validate().is_ok());

        let blank = IngredientPatch {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.validate().unwrap_err(), "Ingredient name is required");
    }
}
