use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::require;
use crate::{api::AppState, error::AppResult, models::User, services::users};

#[derive(Debug, Deserialize)]
pub struct SubjectAreaRequest {
    #[serde(default)]
    pub subject_area: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleAuthRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Creates a guest account, or updates the subject area of an existing one
pub async fn subject_area(
    State(state): State<AppState>,
    payload: Result<Json<SubjectAreaRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<User>)> {
    let Json(request) = payload?;
    let subject_area = require("subject_area", request.subject_area.as_deref())?;

    match request.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(user_id) => {
            let user = users::set_subject_area(state.store.as_ref(), user_id, subject_area).await?;
            Ok((StatusCode::OK, Json(user)))
        }
        None => {
            let user = users::create_guest(state.store.as_ref(), subject_area).await?;
            Ok((StatusCode::CREATED, Json(user)))
        }
    }
}

/// Upgrades a guest account with a verified Google identity
pub async fn auth_google(
    State(state): State<AppState>,
    payload: Result<Json<GoogleAuthRequest>, JsonRejection>,
) -> AppResult<Json<User>> {
    let Json(request) = payload?;
    let user_id = require("user_id", request.user_id.as_deref())?;
    let id_token = require("id_token", request.id_token.as_deref())?;

    let user = users::upgrade_with_identity(
        state.store.as_ref(),
        state.identity.as_ref(),
        user_id,
        id_token,
    )
    .await?;

    Ok(Json(user))
}
