use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use service::ParticipantService;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub participants: Arc<ParticipantService>,
    /// Roster served by the routes without a `{year}` segment.
    pub default_year: i32,
}

/// Which roster a request addresses: the `{year}` path segment, or the default year.
/// Also carries the raw path parameters for handlers that need the `{id}`.
#[derive(Debug)]
pub struct RosterScope {
    pub year: i32,
    params: HashMap<String, String>,
}

impl RosterScope {
    pub fn id(&self) -> Result<u32, ApiError> {
        let raw = self.params.get("id").map(String::as_str).unwrap_or_default();
        raw.parse().map_err(|_| ApiError::bad_path_param("id", raw))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RosterScope {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let params = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map(|Path(p)| p)
            .unwrap_or_default();
        let year = match params.get("year") {
            Some(raw) => raw.parse().map_err(|_| ApiError::bad_path_param("year", raw))?,
            None => state.default_year,
        };
        Ok(Self { year, params })
    }
}
