use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::{Uuid, Variant, Version};

use service::Record;

use crate::errors::{ApiError, MALFORMED_BODY};
use crate::state::AppState;

pub const UNLOCK_KEY_HEADER: &str = "unlock-key";

/// Body of `POST /api/{id}`. Extra fields are ignored.
#[derive(Debug, Deserialize)]
pub struct WriteRecordInput {
    pub data: String,
}

/// Accept only the hyphenated, case-insensitive form of a version 4 UUID.
pub fn parse_record_id(raw: &str) -> Result<Uuid, ApiError> {
    if raw.len() != 36 {
        return Err(ApiError::Validation(format!(
            "invalid id {raw:?}: expected a hyphenated UUID"
        )));
    }
    let id = Uuid::try_parse(raw)
        .map_err(|e| ApiError::Validation(format!("invalid id {raw:?}: {e}")))?;
    if id.get_version() != Some(Version::Random) || id.get_variant() != Variant::RFC4122 {
        return Err(ApiError::Validation(format!(
            "invalid id {raw:?}: expected a version 4 UUID"
        )));
    }
    Ok(id)
}

/// Missing header means the empty unlock key.
pub fn unlock_key(headers: &HeaderMap) -> Result<String, ApiError> {
    match headers.get(UNLOCK_KEY_HEADER) {
        None => Ok(String::new()),
        Some(v) => std::str::from_utf8(v.as_bytes())
            .map(str::to_owned)
            .map_err(|_| ApiError::Validation("Unlock-Key header must be valid UTF-8".into())),
    }
}

/// The body must be a JSON object; derived struct decoding alone would also take `["x"]`.
pub fn parse_write_body(body: &[u8]) -> Result<WriteRecordInput, ApiError> {
    let malformed = || ApiError::Validation(MALFORMED_BODY.into());
    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(body).map_err(|_| malformed())?;
    serde_json::from_value(serde_json::Value::Object(object)).map_err(|_| malformed())
}

#[utoipa::path(
    get, path = "/api/{id}", tag = "records",
    params(
        ("id" = String, Path, description = "Version 4 UUID of the record"),
        ("Unlock-Key" = Option<String>, Header, description = "Unlock key, empty when absent")
    ),
    responses(
        (status = 200, description = "Record found", body = crate::openapi::RecordDoc),
        (status = 404, description = "Entity not found", body = crate::openapi::ErrorDoc),
        (status = 422, description = "Invalid id", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store failure", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Record>, ApiError> {
    let id = parse_record_id(&raw_id)?;
    let key = unlock_key(&headers)?;
    match state.store.lookup(id, &key).await? {
        Some(rec) => Ok(Json(rec)),
        None => Err(ApiError::NotFound),
    }
}

#[utoipa::path(
    post, path = "/api/{id}", tag = "records",
    params(
        ("id" = String, Path, description = "Version 4 UUID of the record"),
        ("Unlock-Key" = Option<String>, Header, description = "Unlock key, empty when absent")
    ),
    request_body = crate::openapi::WriteRecordDoc,
    responses(
        (status = 200, description = "Stored"),
        (status = 422, description = "Invalid id or malformed body", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store failure", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn put_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_record_id(&raw_id)?;
    let input = parse_write_body(&body)?;
    let key = unlock_key(&headers)?;

    state.store.upsert(&Record::new(id, key, input.data)).await?;
    info!(%id, "record written");
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/json")]))
}
