use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse},
        orders::{CreateOrderRequest, OrderList, UpdateOrderRequest},
        products::{CreateProductRequest, ImageInput, ProductList, UpdateProductRequest},
        upload::{UploadRequest, UploadResponse},
    },
    models::{Customer, DeliveryStatus, Order, PaymentStatus, Product, ProductImage},
    response::{ApiResponse, Meta},
    routes::{auth, health, orders, products, upload},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        products::list_products,
        products::create_product,
        products::update_product,
        products::delete_product,
        orders::list_orders,
        orders::lookup_orders,
        orders::create_order,
        orders::update_order,
        orders::delete_order,
        upload::upload,
    ),
    components(
        schemas(
            Product,
            ProductImage,
            Customer,
            Order,
            PaymentStatus,
            DeliveryStatus,
            ImageInput,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateOrderRequest,
            UpdateOrderRequest,
            OrderList,
            LoginRequest,
            LoginResponse,
            UploadRequest,
            UploadResponse,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<LoginResponse>,
            ApiResponse<UploadResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Orders", description = "Order and lookup endpoints"),
        (name = "Auth", description = "Admin session endpoints"),
        (name = "Upload", description = "Inline image upload"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
