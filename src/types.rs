//! Domain model: generation requests, the generated artifact, and the
//! concrete schemas the structured client enforces on model output.

use crate::schema::ValueSchema;
use serde::{Deserialize, Serialize};

/// Minimum number of stored ingredients before any model call is made.
pub const MIN_INGREDIENTS: usize = 4;

/// Which kind of generation the caller is asking for. Also selects the
/// ingredient shelf (food vs. drink) read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Food,
    Drink,
}

/// Caller constraints forwarded to the prompt builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    /// e.g. "breakfast", "dinner". Ignored for cocktails.
    #[serde(default)]
    pub meal_type: Option<String>,
    /// Upper bound on total preparation time, in minutes.
    #[serde(default)]
    pub max_minutes: Option<u32>,
    /// How many people the result should serve.
    pub people_count: u32,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            meal_type: None,
            max_minutes: None,
            people_count: 2,
        }
    }
}

/// An inbound generation request. Already validated by the HTTP layer;
/// ingredients and tools are fetched from the stores, not supplied here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub domain: Domain,
    #[serde(default)]
    pub constraints: Constraints,
    /// Free-text instructions ("spicy", "no nuts", ...). May be empty.
    #[serde(default)]
    pub instructions: String,
}

/// Difficulty rating produced by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Whether the artifact is a food recipe or a cocktail. Assigned by the
/// orchestrator from the request domain, never by the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    #[default]
    Recipe,
    Cocktail,
}

/// One ingredient line of a generated artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientLine {
    pub ingredient_text: String,
}

/// One preparation step of a generated artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeStep {
    pub step_text: String,
    pub step_duration: String,
}

/// The generated recipe or cocktail.
///
/// Constructed in memory from validated model output. `id` and `kind` are
/// assigned by the orchestrator after validation (the model schema does not
/// include them); `id` is stable for the lifetime of the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeArtifact {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<IngredientLine>,
    pub steps: Vec<RecipeStep>,
    pub total_time: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub kind: ArtifactKind,
}

/// Output of the title stage. The title seeds both the body and image
/// prompts, so it is generated (and validated) on its own first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleOnly {
    pub title: String,
}

/// Schema for the title stage: a single bounded string.
pub fn title_schema() -> ValueSchema {
    ValueSchema::new().string("title", 1, 50)
}

/// Schema for the full artifact body.
///
/// Mirrors [`RecipeArtifact`] minus `id` and `kind`, which the orchestrator
/// assigns itself.
pub fn artifact_schema() -> ValueSchema {
    ValueSchema::new()
        .string("title", 1, 50)
        .string("description", 1, 120)
        .array(
            "ingredients",
            1,
            ValueSchema::new().text("ingredientText"),
        )
        .array(
            "steps",
            1,
            ValueSchema::new().text("stepText").text("stepDuration"),
        )
        .text("totalTime")
        .enumeration("difficulty", &["easy", "medium", "hard"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_artifact_json() -> serde_json::Value {
        json!({
            "title": "Simple Pancakes",
            "description": "Fluffy pancakes from pantry staples.",
            "ingredients": [
                {"ingredientText": "2 eggs"},
                {"ingredientText": "200g flour"}
            ],
            "steps": [
                {"stepText": "Whisk everything together.", "stepDuration": "5 min"},
                {"stepText": "Fry in butter.", "stepDuration": "10 min"}
            ],
            "totalTime": "15 min",
            "difficulty": "easy"
        })
    }

    #[test]
    fn test_artifact_schema_accepts_valid_body() {
        assert!(artifact_schema().validate(&valid_artifact_json()).is_ok());
    }

    #[test]
    fn test_artifact_schema_rejects_empty_ingredients() {
        let mut body = valid_artifact_json();
        body["ingredients"] = json!([]);
        assert!(artifact_schema().validate(&body).is_err());
    }

    #[test]
    fn test_artifact_schema_rejects_long_description() {
        let mut body = valid_artifact_json();
        body["description"] = json!("x".repeat(121));
        assert!(artifact_schema().validate(&body).is_err());
    }

    #[test]
    fn test_artifact_schema_rejects_unknown_difficulty() {
        let mut body = valid_artifact_json();
        body["difficulty"] = json!("trivial");
        assert!(artifact_schema().validate(&body).is_err());
    }

    #[test]
    fn test_artifact_deserializes_with_defaults() {
        let artifact: RecipeArtifact = serde_json::from_value(valid_artifact_json()).unwrap();
        assert_eq!(artifact.title, "Simple Pancakes");
        assert_eq!(artifact.ingredients.len(), 2);
        assert_eq!(artifact.steps[1].step_duration, "10 min");
        assert_eq!(artifact.difficulty, Difficulty::Easy);
        // Not part of the model schema; filled in by the orchestrator.
        assert!(artifact.id.is_empty());
        assert_eq!(artifact.kind, ArtifactKind::Recipe);
    }

    #[test]
    fn test_artifact_serializes_camel_case() {
        let artifact: RecipeArtifact = serde_json::from_value(valid_artifact_json()).unwrap();
        let value = serde_json::to_value(&artifact).unwrap();
        assert!(value.get("totalTime").is_some());
        assert!(value["steps"][0].get("stepText").is_some());
        assert!(value.get("total_time").is_none());
    }

    #[test]
    fn test_title_schema_bounds() {
        assert!(title_schema().validate(&json!({"title": "Mojito"})).is_ok());
        assert!(title_schema()
            .validate(&json!({ "title": "x".repeat(51) }))
            .is_err());
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let req: GenerationRequest =
            serde_json::from_value(json!({"domain": "food", "constraints": {"peopleCount": 4}}))
                .unwrap();
        assert_eq!(req.domain, Domain::Food);
        assert_eq!(req.constraints.people_count, 4);
        assert!(req.instructions.is_empty());
    }
}
