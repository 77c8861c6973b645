use argon2::{Argon2, PasswordHasher};
use bazaar_api::{config::AppConfig, db::create_pool};
use password_hash::{SaltString, rand_core::OsRng};
use uuid::Uuid;

struct SeedProduct {
    name: &'static str,
    price: i64,
    description: &'static str,
    category: &'static str,
    image_url: &'static str,
    thumbnail_url: &'static str,
}

const INITIAL_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "프리미엄 과일 바구니",
        price: 55000,
        description: "제철을 맞은 신선하고 당도 높은 과일들로만 엄선하여 구성한 프리미엄 과일 바구니입니다. 소중한 분들께 감사의 마음을 전하세요.",
        category: "과일/채소",
        image_url: "https://picsum.photos/seed/fruitbasket/600/600",
        thumbnail_url: "https://picsum.photos/seed/fruitbasket/200/200",
    },
    SeedProduct {
        name: "고급 한과 선물세트",
        price: 48000,
        description: "장인의 손길로 정성껏 만든 전통 한과 세트입니다. 남녀노소 모두가 즐길 수 있는 건강하고 맛있는 간식입니다.",
        category: "가공/수제식품",
        image_url: "https://picsum.photos/seed/koreansnack/600/600",
        thumbnail_url: "https://picsum.photos/seed/koreansnack/200/200",
    },
    SeedProduct {
        name: "수제 햄 선물세트",
        price: 62000,
        description: "엄선된 국내산 돼지고기로 만든 풍미 가득한 수제 햄 세트. 특별한 날 식탁을 더욱 풍성하게 만들어 줍니다.",
        category: "가공/수제식품",
        image_url: "https://picsum.photos/seed/hamset/600/600",
        thumbnail_url: "https://picsum.photos/seed/hamset/200/200",
    },
    SeedProduct {
        name: "유기농 버섯 모음",
        price: 35000,
        description: "자연의 향을 그대로 담은 유기농 버섯 모음입니다. 다양한 요리에 활용하여 건강과 맛을 동시에 챙길 수 있습니다.",
        category: "과일/채소",
        image_url: "https://picsum.photos/seed/mushroom/600/600",
        thumbnail_url: "https://picsum.photos/seed/mushroom/200/200",
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "1004".to_string());
    let admin_id = ensure_admin(&pool, &username, &password).await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, username: &str, password: &str) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO admins (id, username, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (username) DO UPDATE SET password_hash = EXCLUDED.password_hash
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    println!("Ensured admin account {username}");
    Ok(row.0)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT count(*) FROM products")
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        println!("Products already present, skipping seed");
        return Ok(());
    }

    for product in INITIAL_PRODUCTS {
        let product_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO products (id, name, price, description, category) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product_id)
        .bind(product.name)
        .bind(product.price)
        .bind(product.description)
        .bind(product.category)
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO product_images (id, product_id, image_url, thumbnail_url, position)
            VALUES ($1, $2, $3, $4, 1)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(product.image_url)
        .bind(product.thumbnail_url)
        .execute(pool)
        .await?;
    }

    println!("Seeded {} products", INITIAL_PRODUCTS.len());
    Ok(())
}
