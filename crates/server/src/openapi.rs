use axum::Json;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RecordDoc { pub id: String, pub unlock_key: String, pub data: String }

#[derive(ToSchema)]
pub struct WriteRecordDoc { pub data: String }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::records::get_record,
        crate::records::put_record,
    ),
    components(
        schemas(
            HealthResponse,
            RecordDoc,
            WriteRecordDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "records")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
