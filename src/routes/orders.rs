use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, OrderList, OrderLookupQuery, UpdateOrderRequest},
    error::AppResult,
    middleware::auth::AdminSession,
    models::Order,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/", post(create_order))
        .route("/lookup", get(lookup_orders))
        .route("/{id}", patch(update_order))
        .route("/{id}", delete(delete_order))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "All orders with product and customer joined, newest first", body = ApiResponse<OrderList>),
        (status = 500, description = "Storage failure"),
    ),
    tag = "Orders"
)]
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/lookup",
    params(
        ("name" = String, Query, description = "Customer name, exact match"),
        ("phone" = String, Query, description = "Customer phone; separators ignored"),
    ),
    responses(
        (status = 200, description = "Orders for that name and phone", body = ApiResponse<OrderList>),
        (status = 400, description = "Missing name or phone"),
    ),
    tag = "Orders"
)]
pub async fn lookup_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderLookupQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp =
        order_service::lookup_orders(&state, query.name.as_deref(), query.phone.as_deref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created, customer upserted by phone", body = ApiResponse<Order>),
        (status = 400, description = "Missing or malformed field"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let resp = order_service::create_order(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order statuses and/or fields updated", body = ApiResponse<Order>),
        (status = 400, description = "Unknown status code or backward transition"),
        (status = 404, description = "Order not found"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_order(&state, &session, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled"),
        (status = 404, description = "Order not found"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::delete_order(&state, &session, id).await?;
    Ok(Json(resp))
}
