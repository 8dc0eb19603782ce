//! The onboarding draft and the option tables the wizard offers.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::auth::Identity;
use crate::error::OnboardingError;
use crate::ingredients::IngredientRef;
use crate::profile::{DietaryGoal, DietaryGoals, Preferences, ProfileRequest};

/// A selectable dietary goal.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GoalOption {
    pub goal: DietaryGoal,
    pub label: &'static str,
    pub description: &'static str,
}

pub static GOAL_OPTIONS: &[GoalOption] = &[
    GoalOption {
        goal: DietaryGoal::WeightLoss,
        label: "Weight Loss",
        description: "Focus on calorie deficit and lean proteins",
    },
    GoalOption {
        goal: DietaryGoal::Maintenance,
        label: "Maintenance",
        description: "Balance your nutrition and maintain weight",
    },
    GoalOption {
        goal: DietaryGoal::Bulking,
        label: "Muscle Gain",
        description: "Increase protein and healthy calories",
    },
];

/// A selectable dietary restriction.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RestrictionOption {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

pub static RESTRICTION_OPTIONS: &[RestrictionOption] = &[
    RestrictionOption { id: "vegetarian", label: "Vegetarian", icon: "🥗" },
    RestrictionOption { id: "vegan", label: "Vegan", icon: "🌱" },
    RestrictionOption { id: "gluten_free", label: "Gluten Free", icon: "🌾" },
    RestrictionOption { id: "dairy_free", label: "Dairy Free", icon: "🥛" },
    RestrictionOption { id: "keto", label: "Keto", icon: "🥑" },
    RestrictionOption { id: "paleo", label: "Paleo", icon: "🍖" },
];

/// Which ingredient list a selection applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngredientList {
    Favorites,
    Avoid,
}

/// In-memory onboarding answers. Never persisted until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub display_name: String,
    pub dietary_goal: DietaryGoal,
    pub dietary_restrictions: BTreeSet<String>,
    /// Keyed by selected restriction. `None` means the restriction is
    /// selected but no sub-option has been chosen yet; a restriction with no
    /// key here is not selected.
    pub restriction_options: BTreeMap<String, Option<BTreeSet<String>>>,
    pub favorite_ingredients: Vec<IngredientRef>,
    pub disliked_ingredients: Vec<IngredientRef>,
}

impl ProfileDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    pub fn set_goal(&mut self, goal: DietaryGoal) {
        self.dietary_goal = goal;
    }

    /// Set the goal from its wire id (`weight_loss`, `maintenance`, `bulking`).
    pub fn set_goal_id(&mut self, goal_id: &str) -> Result<(), OnboardingError> {
        self.dietary_goal = goal_id.parse()?;
        Ok(())
    }

    /// Select the restriction if absent, deselect it if present.
    /// Deselecting also drops its sub-options. Returns whether it is now selected.
    pub fn toggle_restriction(&mut self, id: &str) -> bool {
        if self.dietary_restrictions.remove(id) {
            self.restriction_options.remove(id);
            false
        } else {
            self.dietary_restrictions.insert(id.to_string());
            self.restriction_options.insert(id.to_string(), None);
            true
        }
    }

    /// Toggle one sub-option of a selected restriction.
    /// Returns whether the option is now chosen.
    pub fn toggle_restriction_option(
        &mut self,
        restriction_id: &str,
        option: &str,
    ) -> Result<bool, OnboardingError> {
        let slot = self
            .restriction_options
            .get_mut(restriction_id)
            .ok_or_else(|| OnboardingError::RestrictionNotSelected(restriction_id.to_string()))?;

        let options = slot.get_or_insert_with(BTreeSet::new);
        let chosen = if options.remove(option) {
            false
        } else {
            options.insert(option.to_string());
            true
        };
        if options.is_empty() {
            *slot = None;
        }
        Ok(chosen)
    }

    /// Sub-options chosen for a restriction.
    ///
    /// `None` when the restriction isn't selected; `Some(None)` when it is
    /// selected but nothing has been chosen yet.
    pub fn restriction_options_for(&self, restriction_id: &str) -> Option<Option<&BTreeSet<String>>> {
        self.restriction_options
            .get(restriction_id)
            .map(|slot| slot.as_ref())
    }

    pub fn ingredients(&self, list: IngredientList) -> &[IngredientRef] {
        match list {
            IngredientList::Favorites => &self.favorite_ingredients,
            IngredientList::Avoid => &self.disliked_ingredients,
        }
    }

    fn ingredients_mut(&mut self, list: IngredientList) -> &mut Vec<IngredientRef> {
        match list {
            IngredientList::Favorites => &mut self.favorite_ingredients,
            IngredientList::Avoid => &mut self.disliked_ingredients,
        }
    }

    /// Append unless an ingredient with the same id is already in the list.
    /// Returns whether it was added.
    pub fn add_ingredient(&mut self, list: IngredientList, ingredient: IngredientRef) -> bool {
        let items = self.ingredients_mut(list);
        if items.iter().any(|i| i.id == ingredient.id) {
            return false;
        }
        items.push(ingredient);
        true
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn remove_ingredient(&mut self, list: IngredientList, id: &str) -> bool {
        let items = self.ingredients_mut(list);
        let before = items.len();
        items.retain(|i| i.id != id);
        items.len() != before
    }

    /// Build the submission body for `identity`.
    pub fn to_request(&self, identity: &Identity) -> ProfileRequest {
        let restriction_options = self
            .restriction_options
            .iter()
            .filter_map(|(id, slot)| {
                slot.as_ref()
                    .map(|opts| (id.clone(), opts.iter().cloned().collect::<Vec<_>>()))
            })
            .collect();

        ProfileRequest {
            user_id: identity.id.clone(),
            email: identity.email.clone(),
            display_name: Some(self.display_name.trim().to_string()),
            dietary_goals: DietaryGoals {
                goal: self.dietary_goal,
                ..Default::default()
            },
            preferences: Preferences {
                dietary_restrictions: self.dietary_restrictions.iter().cloned().collect(),
                restriction_options,
                allergies: Vec::new(),
                favorite_ingredients: self.favorite_ingredients.iter().map(|i| i.id.clone()).collect(),
                disliked_ingredients: self.disliked_ingredients.iter().map(|i| i.id.clone()).collect(),
            },
        }
    }
}
