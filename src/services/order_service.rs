use std::collections::HashMap;

use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CreateOrderRequest, OrderList, UpdateOrderRequest},
    entity::{
        customers::{
            ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers,
            Model as CustomerModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AdminSession, ensure_admin},
    models::{Customer, DeliveryStatus, Order, PaymentStatus, Product},
    response::{ApiResponse, Meta},
    services::product_service,
    state::AppState,
    validation::{
        normalize_phone, required_text, validate_customer_email, validate_customer_name,
        validate_customer_phone, validate_quantity,
    },
};

pub async fn list_orders(state: &AppState) -> AppResult<ApiResponse<OrderList>> {
    let orders = Orders::find()
        .order_by_desc(OrderCol::OrderDate)
        .all(&state.orm)
        .await?;

    let total = orders.len() as i64;
    let items = join_orders(state, orders).await?;

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let product_id = payload
        .product_id
        .ok_or_else(|| AppError::validation("productId is required"))?;
    let quantity = payload
        .quantity
        .ok_or_else(|| AppError::validation("quantity is required"))?;
    validate_quantity(quantity)?;

    let customer_name = required_text(payload.customer_name.as_deref(), "customerName")?;
    validate_customer_name(&customer_name)?;
    let customer_phone = required_text(payload.customer_phone.as_deref(), "customerPhone")?;
    validate_customer_phone(&customer_phone)?;
    validate_customer_email(payload.customer_email.as_deref())?;

    // Resolve the product before touching the customer table, so an order
    // against an unknown product leaves no rows behind.
    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let customer = upsert_customer(
        state,
        &customer_name,
        &customer_phone,
        payload.customer_email.as_deref(),
        payload.customer_address.as_deref(),
    )
    .await?;

    let delivery_address = payload
        .customer_address
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        customer_id: Set(customer.id),
        quantity: Set(quantity),
        customer_name: Set(customer_name),
        customer_phone: Set(customer_phone),
        delivery_address: Set(delivery_address),
        payment_status: Set(PaymentStatus::Pending.code().to_string()),
        delivery_status: Set(DeliveryStatus::Preparing.code().to_string()),
        order_date: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let mut images = product_service::load_images(state, &[product.id]).await?;
    let product = product_service::product_from_entity(
        product,
        images.remove(&order.product_id).unwrap_or_default(),
    );

    let order = order_from_entity(order, Some(product), Some(customer_from_entity(customer)))?;
    Ok(ApiResponse::success("Order created", order, Some(Meta::empty())))
}

pub async fn update_order(
    state: &AppState,
    session: &AdminSession,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(session)?;
    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current_payment = parse_payment(&existing.payment_status)?;
    let current_delivery = parse_delivery(&existing.delivery_status)?;

    let mut active: OrderActive = existing.into();

    if let Some(code) = payload.payment_status.as_deref() {
        let next = PaymentStatus::from_code(code)
            .ok_or_else(|| AppError::validation(format!("unknown payment status '{code}'")))?;
        if !current_payment.can_transition_to(next) {
            return Err(AppError::validation(format!(
                "payment status cannot move back from {} to {}",
                current_payment.label(),
                next.label()
            )));
        }
        active.payment_status = Set(next.code().to_string());
    }

    if let Some(code) = payload.delivery_status.as_deref() {
        let next = DeliveryStatus::from_code(code)
            .ok_or_else(|| AppError::validation(format!("unknown delivery status '{code}'")))?;
        if !current_delivery.can_transition_to(next) {
            return Err(AppError::validation(format!(
                "delivery status cannot move back from {} to {}",
                current_delivery.label(),
                next.label()
            )));
        }
        active.delivery_status = Set(next.code().to_string());
    }

    if let Some(quantity) = payload.quantity {
        validate_quantity(quantity)?;
        active.quantity = Set(quantity);
    }
    if let Some(address) = payload.delivery_address.as_deref() {
        let trimmed = address.trim();
        active.delivery_address = Set(if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        });
    }
    if let Some(name) = payload.customer_name.as_deref() {
        validate_customer_name(name)?;
        active.customer_name = Set(name.trim().to_string());
    }
    if let Some(phone) = payload.customer_phone.as_deref() {
        validate_customer_phone(phone)?;
        active.customer_phone = Set(phone.trim().to_string());
    }

    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(session.admin_id),
        "order_update",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "payment_status": order.payment_status,
            "delivery_status": order.delivery_status,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let order = join_one(state, order).await?;
    Ok(ApiResponse::success("Order updated", order, Some(Meta::empty())))
}

pub async fn delete_order(
    state: &AppState,
    session: &AdminSession,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(session)?;
    let result = Orders::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(session.admin_id),
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order cancelled",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Customer self-service: every order whose denormalized name matches exactly
/// and whose phone matches digits-only. A linear filter is plenty at bazaar scale.
pub async fn lookup_orders(
    state: &AppState,
    name: Option<&str>,
    phone: Option<&str>,
) -> AppResult<ApiResponse<OrderList>> {
    let name = required_text(name, "name")?;
    let phone = required_text(phone, "phone")?;

    let orders = Orders::find()
        .order_by_desc(OrderCol::OrderDate)
        .all(&state.orm)
        .await?;
    let joined = join_orders(state, orders).await?;

    let items = filter_orders_by_customer(joined, &name, &phone);
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::total(total)),
    ))
}

/// Pure filter behind [`lookup_orders`], kept separate so it can be exercised
/// without a database.
pub fn filter_orders_by_customer(orders: Vec<Order>, name: &str, phone: &str) -> Vec<Order> {
    let wanted_phone = normalize_phone(phone);
    orders
        .into_iter()
        .filter(|order| {
            order.customer_name == name.trim()
                && normalize_phone(&order.customer_phone) == wanted_phone
        })
        .collect()
}

/// Upsert keyed by phone: name always refreshed, email/address only replaced
/// by non-empty values.
async fn upsert_customer(
    state: &AppState,
    name: &str,
    phone: &str,
    email: Option<&str>,
    address: Option<&str>,
) -> AppResult<CustomerModel> {
    let email = email.map(str::trim).filter(|s| !s.is_empty());
    let address = address.map(str::trim).filter(|s| !s.is_empty());

    let existing = Customers::find()
        .filter(CustomerCol::Phone.eq(phone))
        .one(&state.orm)
        .await?;

    let customer = match existing {
        Some(existing) => {
            let kept_email = existing.email.clone();
            let kept_address = existing.address.clone();
            let mut active: CustomerActive = existing.into();
            active.name = Set(name.to_string());
            active.email = Set(email.map(str::to_string).or(kept_email));
            active.address = Set(address.map(str::to_string).or(kept_address));
            active.update(&state.orm).await?
        }
        None => {
            CustomerActive {
                id: Set(Uuid::new_v4()),
                name: Set(name.to_string()),
                phone: Set(phone.to_string()),
                email: Set(email.map(str::to_string)),
                address: Set(address.map(str::to_string)),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    Ok(customer)
}

async fn join_one(state: &AppState, order: OrderModel) -> AppResult<Order> {
    let mut joined = join_orders(state, vec![order]).await?;
    joined
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("joined order vanished")))
}

/// Attach product (+images) and customer to each order. References that no
/// longer resolve join as None rather than failing the whole listing.
async fn join_orders(state: &AppState, orders: Vec<OrderModel>) -> AppResult<Vec<Order>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let mut product_ids: Vec<Uuid> = orders.iter().map(|o| o.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    let mut customer_ids: Vec<Uuid> = orders.iter().map(|o| o.customer_id).collect();
    customer_ids.sort_unstable();
    customer_ids.dedup();

    let product_rows = Products::find()
        .filter(ProductCol::Id.is_in(product_ids.clone()))
        .all(&state.orm)
        .await?;
    let mut images = product_service::load_images(state, &product_ids).await?;
    let products: HashMap<Uuid, Product> = product_rows
        .into_iter()
        .map(|p| {
            let imgs = images.remove(&p.id).unwrap_or_default();
            (p.id, product_service::product_from_entity(p, imgs))
        })
        .collect();

    let customers: HashMap<Uuid, Customer> = Customers::find()
        .filter(CustomerCol::Id.is_in(customer_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| (c.id, customer_from_entity(c)))
        .collect();

    orders
        .into_iter()
        .map(|order| {
            let product = products.get(&order.product_id).cloned();
            let customer = customers.get(&order.customer_id).cloned();
            order_from_entity(order, product, customer)
        })
        .collect()
}

fn parse_payment(code: &str) -> AppResult<PaymentStatus> {
    PaymentStatus::from_code(code)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("corrupt payment status '{code}'")))
}

fn parse_delivery(code: &str) -> AppResult<DeliveryStatus> {
    DeliveryStatus::from_code(code)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("corrupt delivery status '{code}'")))
}

fn order_from_entity(
    model: OrderModel,
    product: Option<Product>,
    customer: Option<Customer>,
) -> AppResult<Order> {
    Ok(Order {
        id: model.id,
        product_id: model.product_id,
        customer_id: model.customer_id,
        quantity: model.quantity,
        customer_name: model.customer_name,
        customer_phone: model.customer_phone,
        delivery_address: model.delivery_address,
        payment_status: parse_payment(&model.payment_status)?,
        delivery_status: parse_delivery(&model.delivery_status)?,
        order_date: model.order_date.to_utc(),
        product,
        customer,
    })
}

fn customer_from_entity(model: CustomerModel) -> Customer {
    Customer {
        id: model.id,
        name: model.name,
        phone: model.phone,
        email: model.email,
        address: model.address,
        created_at: model.created_at.to_utc(),
    }
}
