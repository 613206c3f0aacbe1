use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::nutrition::fallback::{DEFAULT_RECOMMENDATIONS, UNKNOWN_FOOD_TYPE, UNKNOWN_LEVEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AnalysisSource {
    #[serde(rename = "LLM")]
    Llm,
    Fallback,
}

/// Qualitative nutrient levels (`tinggi` / `sedang` / `rendah`), plus the
/// dominant vitamins as free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NutrientProfile {
    #[serde(deserialize_with = "null_as_unknown")]
    pub protein: String,
    #[serde(alias = "karbohidrat", deserialize_with = "null_as_unknown")]
    pub carbs: String,
    #[serde(alias = "lemak", deserialize_with = "null_as_unknown")]
    pub fat: String,
    #[serde(alias = "serat", deserialize_with = "null_as_unknown")]
    pub fiber: String,
    #[serde(alias = "vitamin", deserialize_with = "null_as_unknown")]
    pub vitamins: String,
}

impl NutrientProfile {
    pub fn unknown() -> Self {
        Self {
            protein: UNKNOWN_LEVEL.to_string(),
            carbs: UNKNOWN_LEVEL.to_string(),
            fat: UNKNOWN_LEVEL.to_string(),
            fiber: UNKNOWN_LEVEL.to_string(),
            vitamins: UNKNOWN_LEVEL.to_string(),
        }
    }

    fn normalized(self) -> Self {
        let level = |value: String| {
            let value = value.trim();
            if value.is_empty() {
                UNKNOWN_LEVEL.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            protein: level(self.protein),
            carbs: level(self.carbs),
            fat: level(self.fat),
            fiber: level(self.fiber),
            vitamins: level(self.vitamins),
        }
    }
}

impl Default for NutrientProfile {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Nutrition report returned to callers. Every field is always populated;
/// `recommendations` is never empty once normalised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NutritionAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub food_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nutrition: NutrientProfile,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deficiencies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
}

impl NutritionAnalysis {
    /// Fills the gaps a partial LLM answer leaves: unknown food type and
    /// levels, blank list entries dropped, default recommendations.
    pub fn normalized(self) -> Self {
        let food_type = self.food_type.trim();
        let recommendations = clean_list(self.recommendations);

        Self {
            food_type: if food_type.is_empty() {
                UNKNOWN_FOOD_TYPE.to_string()
            } else {
                food_type.to_string()
            },
            components: clean_list(self.components),
            nutrition: self.nutrition.normalized(),
            deficiencies: clean_list(self.deficiencies),
            recommendations: if recommendations.is_empty() {
                DEFAULT_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect()
            } else {
                recommendations
            },
        }
    }
}

impl Default for NutritionAnalysis {
    fn default() -> Self {
        Self {
            food_type: UNKNOWN_FOOD_TYPE.to_string(),
            components: Vec::new(),
            nutrition: NutrientProfile::unknown(),
            deficiencies: Vec::new(),
            recommendations: DEFAULT_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(|| UNKNOWN_LEVEL.to_string()))
}
