use std::collections::HashMap;

use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{CreateProductRequest, ImageInput, ProductList, UpdateProductRequest},
    entity::{
        product_images::{
            ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages,
            Model as ImageModel,
        },
        products::{
            ActiveModel as ProductActive, Column as ProductCol, Entity as Products,
            Model as ProductModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AdminSession, ensure_admin},
    models::{Product, ProductImage},
    response::{ApiResponse, Meta},
    state::AppState,
    validation::{required_text, validate_category, validate_price},
};

/// Business rule enforced at the boundary, not in the schema.
pub const MAX_PRODUCT_IMAGES: usize = 3;

pub async fn list_products(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let products = Products::find()
        .order_by_desc(ProductCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let mut images = load_images(state, &ids).await?;

    let total = products.len() as i64;
    let items = products
        .into_iter()
        .map(|p| {
            let imgs = images.remove(&p.id).unwrap_or_default();
            product_from_entity(p, imgs)
        })
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn create_product(
    state: &AppState,
    session: &AdminSession,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(session)?;
    let fields = validate_product_fields(
        payload.name.as_deref(),
        payload.price,
        payload.description.as_deref(),
        payload.category.as_deref(),
        &payload.images,
    )?;

    let id = Uuid::new_v4();
    let product = ProductActive {
        id: Set(id),
        name: Set(fields.name),
        price: Set(fields.price),
        description: Set(fields.description),
        category: Set(fields.category),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    // Images are written after the product row exists; the two steps are not
    // transactionally linked, matching the storefront's historical behavior.
    let images = insert_images(state, product.id, &payload.images).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(session.admin_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product, images),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    session: &AdminSession,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(session)?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let fields = validate_product_fields(
        payload.name.as_deref(),
        payload.price,
        payload.description.as_deref(),
        payload.category.as_deref(),
        &payload.images,
    )?;

    let mut active: ProductActive = existing.into();
    active.name = Set(fields.name);
    active.price = Set(fields.price);
    active.description = Set(fields.description);
    active.category = Set(fields.category);
    let product = active.update(&state.orm).await?;

    // Full replace of the image set: delete everything, recreate from payload.
    ProductImages::delete_many()
        .filter(ImageCol::ProductId.eq(product.id))
        .exec(&state.orm)
        .await?;
    let images = insert_images(state, product.id, &payload.images).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(session.admin_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product, images),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    session: &AdminSession,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(session)?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(session.admin_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Images for a set of products, ordered by position, grouped by product.
pub(crate) async fn load_images(
    state: &AppState,
    product_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<ProductImage>>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = ProductImages::find()
        .filter(ImageCol::ProductId.is_in(product_ids.to_vec()))
        .order_by_asc(ImageCol::Position)
        .all(&state.orm)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.product_id)
            .or_default()
            .push(image_from_entity(row));
    }
    Ok(grouped)
}

struct ProductFields {
    name: String,
    price: i64,
    description: String,
    category: String,
}

fn validate_product_fields(
    name: Option<&str>,
    price: Option<i64>,
    description: Option<&str>,
    category: Option<&str>,
    images: &[ImageInput],
) -> Result<ProductFields, AppError> {
    let name = required_text(name, "name")?;
    let description = required_text(description, "description")?;
    let category = required_text(category, "category")?;
    validate_category(&category)?;
    let price = price.ok_or_else(|| AppError::validation("price is required"))?;
    validate_price(price)?;
    if images.len() > MAX_PRODUCT_IMAGES {
        return Err(AppError::validation(format!(
            "a product can carry at most {MAX_PRODUCT_IMAGES} images"
        )));
    }
    Ok(ProductFields {
        name,
        price,
        description,
        category,
    })
}

async fn insert_images(
    state: &AppState,
    product_id: Uuid,
    images: &[ImageInput],
) -> AppResult<Vec<ProductImage>> {
    let mut created = Vec::with_capacity(images.len());
    for (index, image) in images.iter().enumerate() {
        let row = ImageActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            image_url: Set(image.image_url.clone()),
            thumbnail_url: Set(image.thumbnail_url.clone()),
            position: Set(index as i32 + 1),
        }
        .insert(&state.orm)
        .await?;
        created.push(image_from_entity(row));
    }
    Ok(created)
}

pub(crate) fn product_from_entity(model: ProductModel, images: Vec<ProductImage>) -> Product {
    Product {
        id: model.id,
        name: model.name,
        price: model.price,
        description: model.description,
        category: model.category,
        images,
        created_at: model.created_at.to_utc(),
    }
}

fn image_from_entity(model: ImageModel) -> ProductImage {
    ProductImage {
        id: model.id,
        image_url: model.image_url,
        thumbnail_url: model.thumbnail_url,
        position: model.position,
    }
}
