use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use models::{NewParticipant, Participant};
use tracing::debug;

use crate::errors::ApiError;
use crate::state::{AppState, RosterScope};

pub const AMOUNT_PARAMETER: &str = "amount";
pub const SCORE_PARAMETER: &str = "score";
pub const NEW_NAME_PARAMETER: &str = "newName";

type Params = Query<HashMap<String, String>>;

fn query_u16(params: &HashMap<String, String>, key: &str, err: fn() -> ApiError) -> Result<u16, ApiError> {
    params
        .get(key)
        .map(String::as_str)
        .unwrap_or_default()
        .parse()
        .map_err(|_| err())
}

/// POST: add a participant to the roster
pub async fn create(
    State(state): State<AppState>,
    scope: RosterScope,
    body: Bytes,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    let input: NewParticipant =
        serde_json::from_slice(&body).map_err(|_| ApiError::MalformedRequestBody)?;
    let created = state.participants.create(scope.year, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET: whole roster, highest score first
pub async fn list(
    State(state): State<AppState>,
    scope: RosterScope,
) -> Result<Json<Vec<Participant>>, ApiError> {
    debug!(year = scope.year, "list participants");
    Ok(Json(state.participants.get_all(scope.year).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    scope: RosterScope,
) -> Result<Json<Participant>, ApiError> {
    let id = scope.id()?;
    Ok(Json(state.participants.get(scope.year, id).await?))
}

/// PUT ?score=n
pub async fn update_score(
    State(state): State<AppState>,
    scope: RosterScope,
    Query(params): Params,
) -> Result<Json<Participant>, ApiError> {
    let id = scope.id()?;
    let score = query_u16(&params, SCORE_PARAMETER, ApiError::bad_score)?;
    Ok(Json(state.participants.update_score(scope.year, id, score).await?))
}

/// PUT ?amount=n
pub async fn increase_score(
    State(state): State<AppState>,
    scope: RosterScope,
    Query(params): Params,
) -> Result<Json<Participant>, ApiError> {
    let id = scope.id()?;
    let amount = query_u16(&params, AMOUNT_PARAMETER, ApiError::bad_amount)?;
    Ok(Json(state.participants.increase_score(scope.year, id, amount).await?))
}

/// PUT ?amount=n
pub async fn decrease_score(
    State(state): State<AppState>,
    scope: RosterScope,
    Query(params): Params,
) -> Result<Json<Participant>, ApiError> {
    let id = scope.id()?;
    let amount = query_u16(&params, AMOUNT_PARAMETER, ApiError::bad_amount)?;
    Ok(Json(state.participants.decrease_score(scope.year, id, amount).await?))
}

/// PUT ?newName=s; a missing parameter counts as an empty name
pub async fn update_name(
    State(state): State<AppState>,
    scope: RosterScope,
    Query(mut params): Params,
) -> Result<Json<Participant>, ApiError> {
    let id = scope.id()?;
    let new_name = params.remove(NEW_NAME_PARAMETER).unwrap_or_default();
    Ok(Json(state.participants.update_name(scope.year, id, new_name).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    scope: RosterScope,
) -> Result<(StatusCode, &'static str), ApiError> {
    let id = scope.id()?;
    state.participants.delete(scope.year, id).await?;
    Ok((StatusCode::OK, "Deleted"))
}
