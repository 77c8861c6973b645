use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The bazaar sells under a small fixed set of categories.
pub const CATEGORIES: &[&str] = &["과일/채소", "가공/수제식품"];

/// Payment axis of an order. Persisted as the code, shown as the Korean label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "결제 대기중",
            Self::Completed => "결제 완료",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PENDING" => Some(Self::Pending),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "결제 대기중" => Some(Self::Pending),
            "결제 완료" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Payment only ever moves forward; re-asserting the current value is a no-op.
    pub const fn can_transition_to(self, next: Self) -> bool {
        !matches!((self, next), (Self::Completed, Self::Pending))
    }
}

/// Delivery axis of an order, independent of payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Preparing,
    Completed,
}

impl DeliveryStatus {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Preparing => "PREPARING",
            Self::Completed => "COMPLETED",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Preparing => "배송 준비중",
            Self::Completed => "배송 완료",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PREPARING" => Some(Self::Preparing),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "배송 준비중" => Some(Self::Preparing),
            "배송 완료" => Some(Self::Completed),
            _ => None,
        }
    }

    pub const fn can_transition_to(self, next: Self) -> bool {
        !matches!((self, next), (Self::Completed, Self::Preparing))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: Uuid,
    pub image_url: String,
    pub thumbnail_url: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub description: String,
    pub category: String,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An order joined with its product and customer. Either join may be null when
/// the referenced row has been deleted out from under the order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    pub customer_id: Uuid,
    pub quantity: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: Option<String>,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub order_date: DateTime<Utc>,
    pub product: Option<Product>,
    pub customer: Option<Customer>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
