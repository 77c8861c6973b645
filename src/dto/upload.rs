use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inline upload: the image travels as base64 in the JSON body, with or
/// without a `data:` URL prefix.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadRequest {
    pub image: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
    pub thumbnail_url: String,
}
