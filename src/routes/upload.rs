use axum::{Json, Router, extract::State, routing::post};

use crate::{
    audit::log_audit,
    dto::upload::{UploadRequest, UploadResponse},
    error::AppResult,
    middleware::auth::{AdminSession, ensure_admin},
    response::{ApiResponse, Meta},
    services::upload_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(upload))
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "Inline image stored; URL and thumbnail URL returned", body = ApiResponse<UploadResponse>),
        (status = 400, description = "Missing image or filename, or undecodable image"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Upload"
)]
pub async fn upload(
    State(state): State<AppState>,
    session: AdminSession,
    Json(payload): Json<UploadRequest>,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    ensure_admin(&session)?;
    let filename = payload.filename.clone();
    let resp = upload_service::process_upload(payload)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(session.admin_id),
        "upload",
        Some("uploads"),
        Some(serde_json::json!({ "filename": filename })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Json(ApiResponse::success(
        "Image stored",
        resp,
        Some(Meta::empty()),
    )))
}
