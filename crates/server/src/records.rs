use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use models::{Record, RecordInput};

use crate::errors::JsonApiError;
use crate::routes::ServerState;

#[utoipa::path(get, path = "/records", tag = "records", responses((status = 200, description = "All records in insertion order", body = [crate::openapi::RecordDoc])))]
pub async fn list(State(state): State<ServerState>) -> Json<Vec<Record>> {
    Json(state.records.list().await)
}

#[utoipa::path(get, path = "/records/{id}", tag = "records", params(("id" = String, Path, description = "Record id")), responses((status = 200, body = crate::openapi::RecordDoc), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Record>, JsonApiError> {
    state.records.get(&id).await.map(Json).ok_or_else(|| JsonApiError::not_found("record"))
}

#[utoipa::path(post, path = "/records", tag = "records", request_body = crate::openapi::RecordInputDoc, responses((status = 201, body = crate::openapi::RecordDoc), (status = 400, description = "Bad Request")))]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<RecordInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), JsonApiError> {
    let Json(input) = body?;
    input.validate().map_err(service::ServiceError::from)?;
    let id = state.records.fresh_id().await;
    let created = state.records.insert(Record::from_input(id, input)).await?;
    info!(id = %created.id, plate = %created.car_plate, "record created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/records/{id}", tag = "records", params(("id" = String, Path, description = "Record id")), request_body = crate::openapi::RecordInputDoc, responses((status = 200, body = crate::openapi::RecordDoc), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Result<Json<RecordInput>, JsonRejection>,
) -> Result<Json<Record>, JsonApiError> {
    let Json(input) = body?;
    input.validate().map_err(service::ServiceError::from)?;
    let updated = state.records.replace(&id, Record::from_input(id.clone(), input)).await?;
    info!(id = %updated.id, "record replaced");
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/records/{id}", tag = "records", params(("id" = String, Path, description = "Record id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Result<StatusCode, JsonApiError> {
    if state.records.remove(&id).await? {
        info!(%id, "record deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("record"))
    }
}
