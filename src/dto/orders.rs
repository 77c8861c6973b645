use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Order;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
}

/// One PATCH payload covers both admin flows: flipping a status axis and
/// editing the order itself. Statuses arrive as codes and are checked against
/// the fixed table, so an unknown value is a 400 rather than a 422.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub payment_status: Option<String>,
    pub delivery_status: Option<String>,
    pub quantity: Option<i32>,
    pub delivery_address: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLookupQuery {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
