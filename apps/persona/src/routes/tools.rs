use axum::{extract::State, Json};
use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::types::ToolDefinition;
use crate::state::AppState;

/// GET /api/v1/tools
/// The tool declarations exactly as they are sent to the model.
pub async fn list_tools_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let definitions: Vec<ToolDefinition> = state
        .engine
        .tools()
        .describe()
        .iter()
        .map(ToolDefinition::from)
        .collect();
    let body = serde_json::to_value(definitions).map_err(anyhow::Error::from)?;
    Ok(Json(body))
}
