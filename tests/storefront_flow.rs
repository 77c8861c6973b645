use bazaar_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        orders::{CreateOrderRequest, UpdateOrderRequest},
        products::{CreateProductRequest, ImageInput},
    },
    error::AppError,
    middleware::auth::AdminSession,
    models::{DeliveryStatus, PaymentStatus},
    services::{order_service, product_service},
    state::AppState,
};
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

fn image(n: u32) -> ImageInput {
    ImageInput {
        image_url: format!("https://picsum.photos/seed/item{n}/600/600"),
        thumbnail_url: format!("https://picsum.photos/seed/item{n}/200/200"),
    }
}

fn product_request(name: &str, images: Vec<ImageInput>) -> CreateProductRequest {
    CreateProductRequest {
        name: Some(name.to_string()),
        price: Some(10_000),
        description: Some("자선 바자회 상품입니다.".to_string()),
        category: Some("과일/채소".to_string()),
        images,
    }
}

fn order_request(product_id: Uuid, quantity: i32, name: &str, phone: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        product_id: Some(product_id),
        quantity: Some(quantity),
        customer_name: Some(name.to_string()),
        customer_phone: Some(phone.to_string()),
        customer_email: None,
        customer_address: None,
    }
}

// The full storefront lifecycle in one sequential flow, so parallel test
// threads never fight over the shared database.
#[tokio::test]
async fn storefront_catalog_and_order_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let admin = AdminSession {
        admin_id: Uuid::new_v4(),
        role: "admin".into(),
    };

    // --- catalog boundary rules ---

    let too_many = product_service::create_product(
        &state,
        &admin,
        product_request("상품B", vec![image(1), image(2), image(3), image(4)]),
    )
    .await;
    assert!(matches!(too_many, Err(AppError::Validation(_))));

    let missing_name = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: None,
            ..product_request("", vec![])
        },
    )
    .await;
    assert!(matches!(missing_name, Err(AppError::Validation(_))));

    let bad_category = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            category: Some("전자제품".to_string()),
            ..product_request("상품B", vec![])
        },
    )
    .await;
    assert!(matches!(bad_category, Err(AppError::Validation(_))));

    let product = product_service::create_product(
        &state,
        &admin,
        product_request("상품A", vec![image(1), image(2)]),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(product.images.len(), 2);
    assert_eq!(product.images[0].position, 1);
    assert_eq!(product.images[1].position, 2);
    assert!(product.images[0].image_url.contains("item1"));
    assert!(product.images[1].image_url.contains("item2"));

    // --- order creation ---

    let unknown = order_service::create_order(
        &state,
        order_request(Uuid::new_v4(), 1, "홍길동", "010-1234-5678"),
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound)));
    // A rejected order must leave no rows behind.
    assert_eq!(count_rows(&state, "customers").await?, 0);
    assert_eq!(count_rows(&state, "orders").await?, 0);

    let mut first = order_request(product.id, 2, "홍길동", "010-1234-5678");
    first.customer_email = Some("hong@example.com".to_string());
    let order = order_service::create_order(&state, first).await?.data.unwrap();
    assert_eq!(order.quantity, 2);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.delivery_status, DeliveryStatus::Preparing);
    let product_join = order.product.as_ref().expect("product joined");
    assert_eq!(product_join.name, "상품A");
    assert_eq!(product_join.price, 10_000);
    assert_eq!(product_join.images.len(), 2);

    // Same phone, different name: the customer row is shared and renamed,
    // and the stored email survives an empty submission.
    let second = order_service::create_order(
        &state,
        order_request(product.id, 1, "김철수", "010-1234-5678"),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(count_rows(&state, "customers").await?, 1);
    assert_eq!(second.customer_id, order.customer_id);
    let customer = second.customer.as_ref().expect("customer joined");
    assert_eq!(customer.name, "김철수");
    assert_eq!(customer.email.as_deref(), Some("hong@example.com"));

    let listed = order_service::list_orders(&state).await?.data.unwrap();
    assert_eq!(listed.items.len(), 2);
    // Newest first.
    assert_eq!(listed.items[0].id, second.id);

    // --- status axes are independent and forward-only ---

    let updated = order_service::update_order(
        &state,
        &admin,
        order.id,
        UpdateOrderRequest {
            payment_status: Some("COMPLETED".to_string()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.payment_status, PaymentStatus::Completed);
    assert_eq!(updated.delivery_status, DeliveryStatus::Preparing);

    let updated = order_service::update_order(
        &state,
        &admin,
        order.id,
        UpdateOrderRequest {
            delivery_status: Some("COMPLETED".to_string()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.payment_status, PaymentStatus::Completed);
    assert_eq!(updated.delivery_status, DeliveryStatus::Completed);

    let backward = order_service::update_order(
        &state,
        &admin,
        order.id,
        UpdateOrderRequest {
            payment_status: Some("PENDING".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(backward, Err(AppError::Validation(_))));

    let bogus = order_service::update_order(
        &state,
        &admin,
        order.id,
        UpdateOrderRequest {
            delivery_status: Some("SHIPPED".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(bogus, Err(AppError::Validation(_))));

    // --- order edit leaves untouched fields alone ---

    let edited = order_service::update_order(
        &state,
        &admin,
        second.id,
        UpdateOrderRequest {
            quantity: Some(5),
            delivery_address: Some("서울시 중구 세종대로 110".to_string()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(edited.quantity, 5);
    assert_eq!(
        edited.delivery_address.as_deref(),
        Some("서울시 중구 세종대로 110")
    );
    assert_eq!(edited.customer_name, "김철수");
    assert_eq!(edited.payment_status, PaymentStatus::Pending);

    // --- self-service lookup ---

    let found = order_service::lookup_orders(&state, Some("홍길동"), Some("01012345678"))
        .await?
        .data
        .unwrap();
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].id, order.id);

    let none = order_service::lookup_orders(&state, Some("홍길순"), Some("010-1234-5678"))
        .await?
        .data
        .unwrap();
    assert!(none.items.is_empty());

    // --- deleting a referenced product leaves the order dangling, not broken ---

    let doomed = product_service::create_product(&state, &admin, product_request("상품C", vec![]))
        .await?
        .data
        .unwrap();
    let dangling = order_service::create_order(
        &state,
        order_request(doomed.id, 1, "이영희", "010-9999-0000"),
    )
    .await?
    .data
    .unwrap();

    product_service::delete_product(&state, &admin, doomed.id).await?;
    let listed = order_service::list_orders(&state).await?.data.unwrap();
    let survivor = listed
        .items
        .iter()
        .find(|o| o.id == dangling.id)
        .expect("order survives product deletion");
    assert!(survivor.product.is_none());

    // --- cancellation ---

    order_service::delete_order(&state, &admin, dangling.id).await?;
    let again = order_service::delete_order(&state, &admin, dangling.id).await;
    assert!(matches!(again, Err(AppError::NotFound)));

    let missing_product = product_service::delete_product(&state, &admin, doomed.id).await;
    assert!(matches!(missing_product, Err(AppError::NotFound)));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE product_images, orders, customers, products, admins, audit_logs RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn count_rows(state: &AppState, table: &str) -> anyhow::Result<i64> {
    let backend = state.orm.get_database_backend();
    let row = state
        .orm
        .query_one(Statement::from_string(
            backend,
            format!("SELECT count(*) AS n FROM {table}"),
        ))
        .await?
        .expect("count row");
    Ok(row.try_get::<i64>("", "n")?)
}
