use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use gastrogenie::{DEFAULT_MODEL_KEY, MODEL_SPECS, Recipe};

use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;

/// Title of the synthetic assistant card prepended in augmented mode.
pub const LLM_CARD_TITLE: &str = "GastroGenie's Recommendation";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,

    #[serde(default)]
    pub use_llm: bool,

    #[serde(default = "default_model_key")]
    pub model: String,
}

fn default_model_key() -> String {
    DEFAULT_MODEL_KEY.to_string()
}

/// One element of the `/api/chat` response array: either a recipe or the
/// assistant's recommendation card.
#[derive(Debug, Serialize)]
pub struct RecipeCard {
    pub title: String,
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time_minutes: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_region: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_llm_card: bool,
}

impl RecipeCard {
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            prep_time_minutes: recipe.prep_time_minutes,
            calories: recipe.calories,
            protein_g: recipe.protein_g,
            sub_region: recipe.sub_region.clone(),
            img_url: recipe.img_url.clone(),
            is_llm_card: false,
        }
    }

    pub fn assistant(explanation: String) -> Self {
        Self {
            title: LLM_CARD_TITLE.to_string(),
            description: explanation,
            prep_time_minutes: None,
            calories: None,
            protein_g: None,
            sub_region: None,
            img_url: None,
            is_llm_card: true,
        }
    }
}

#[instrument(skip(state, request), fields(use_llm = request.use_llm, model = %request.model))]
pub async fn chat_handler(
    State(state): State<HandlerState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Vec<RecipeCard>>, GatewayError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "query must not be empty".to_string(),
        ));
    }

    debug!(query_len = query.len(), "Processing chat request");

    if request.use_llm {
        let result = state.pipeline.search_augmented(query, &request.model).await?;

        let mut cards = Vec::with_capacity(result.selected.len() + 1);
        cards.push(RecipeCard::assistant(result.explanation));
        cards.extend(
            result
                .selected
                .iter()
                .map(|candidate| RecipeCard::from_recipe(&candidate.recipe)),
        );

        Ok(Json(cards))
    } else {
        let results = state.pipeline.search(query)?;

        Ok(Json(
            results
                .iter()
                .map(|candidate| RecipeCard::from_recipe(&candidate.recipe))
                .collect(),
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[instrument]
pub async fn models_handler() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: MODEL_SPECS
            .iter()
            .map(|spec| ModelInfo {
                id: spec.key,
                name: spec.name,
                description: spec.description,
            })
            .collect(),
    })
}
