//! User profile documents and the `POST /api/profile` request body.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OnboardingError;

/// The user's primary dietary goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietaryGoal {
    WeightLoss,
    #[default]
    Maintenance,
    Bulking,
}

impl DietaryGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeightLoss => "weight_loss",
            Self::Maintenance => "maintenance",
            Self::Bulking => "bulking",
        }
    }
}

impl std::fmt::Display for DietaryGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DietaryGoal {
    type Err = OnboardingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight_loss" => Ok(Self::WeightLoss),
            "maintenance" => Ok(Self::Maintenance),
            "bulking" => Ok(Self::Bulking),
            other => Err(OnboardingError::UnknownGoal(other.to_string())),
        }
    }
}

/// Goal plus optional macro targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietaryGoals {
    #[serde(rename = "type")]
    pub goal: DietaryGoal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_fat: Option<f64>,
}

/// Food preferences. Ingredient lists hold catalog ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    /// Chosen sub-options per restriction.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub restriction_options: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub favorite_ingredients: Vec<String>,
    #[serde(default)]
    pub disliked_ingredients: Vec<String>,
}

/// Body of `POST /api/profile`.
///
/// `user_id` and `email` default to empty so the handler can answer a
/// missing field with its own 400 instead of a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub dietary_goals: DietaryGoals,
    #[serde(default)]
    pub preferences: Preferences,
}

impl ProfileRequest {
    /// Both identity fields are present and non-blank.
    pub fn has_required_fields(&self) -> bool {
        !self.user_id.trim().is_empty() && !self.email.trim().is_empty()
    }
}

/// A stored profile, keyed by `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub dietary_goals: DietaryGoals,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
