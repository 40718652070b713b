use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use models::{User, UserInput};

use crate::errors::JsonApiError;
use crate::routes::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub email: Option<String>,
}

#[utoipa::path(get, path = "/users", tag = "users", params(("email" = Option<String>, Query, description = "Exact email match")), responses((status = 200, body = [crate::openapi::UserDoc])))]
pub async fn list(State(state): State<ServerState>, Query(q): Query<UserQuery>) -> Json<Vec<User>> {
    match q.email {
        Some(email) => Json(state.users.find(|u| u.email == email).await),
        None => Json(state.users.list().await),
    }
}

#[utoipa::path(get, path = "/users/{id}", tag = "users", params(("id" = String, Path, description = "User id")), responses((status = 200, body = crate::openapi::UserDoc), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<User>, JsonApiError> {
    state.users.get(&id).await.map(Json).ok_or_else(|| JsonApiError::not_found("user"))
}

/// A caller-supplied id is kept; otherwise one is assigned.
#[utoipa::path(post, path = "/users", tag = "users", request_body = crate::openapi::UserDoc, responses((status = 201, body = crate::openapi::UserDoc), (status = 400, description = "Bad Request"), (status = 409, description = "Id taken")))]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<UserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), JsonApiError> {
    let Json(mut input) = body?;
    input.validate().map_err(service::ServiceError::from)?;
    let id = match input.id.take().filter(|id| !id.trim().is_empty()) {
        Some(id) => id,
        None => state.users.fresh_id().await,
    };
    let created = state.users.insert(User::from_input(id, input)).await?;
    info!(id = %created.id, email = %created.email, "user created");
    Ok((StatusCode::CREATED, Json(created)))
}
