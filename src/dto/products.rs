use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

/// One image slot as submitted by the admin form. Position is assigned
/// server-side from the submitted order.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    pub image_url: String,
    pub thumbnail_url: String,
}

/// Fields arrive optional so a missing field maps to a 400 validation
/// message rather than a deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageInput>,
}

/// Update is a full replace: scalars overwritten, image set recreated.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageInput>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
