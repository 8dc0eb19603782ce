//! Ingredient catalog: documents, built-in data, client lookup and backend routes.

pub mod catalog;
pub mod lookup;
pub mod model;
pub mod routes;

pub use lookup::{CatalogSource, IngredientLookup, IngredientSelector};
pub use model::{Ingredient, IngredientPatch, IngredientRef, NewIngredient, NutritionalInfo};
pub use routes::ingredient_routes;
