use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use uuid::Uuid;

use bazaar_api::{
    dto::upload::UploadRequest,
    error::AppError,
    models::{DeliveryStatus, Order, PaymentStatus},
    services::{order_service::filter_orders_by_customer, upload_service::process_upload},
    validation,
};

#[test]
fn status_tables_are_bidirectional_and_total() {
    for status in [PaymentStatus::Pending, PaymentStatus::Completed] {
        assert_eq!(PaymentStatus::from_code(status.code()), Some(status));
        assert_eq!(PaymentStatus::from_label(status.label()), Some(status));
    }
    for status in [DeliveryStatus::Preparing, DeliveryStatus::Completed] {
        assert_eq!(DeliveryStatus::from_code(status.code()), Some(status));
        assert_eq!(DeliveryStatus::from_label(status.label()), Some(status));
    }

    assert_eq!(PaymentStatus::Pending.label(), "결제 대기중");
    assert_eq!(PaymentStatus::Completed.label(), "결제 완료");
    assert_eq!(DeliveryStatus::Preparing.label(), "배송 준비중");
    assert_eq!(DeliveryStatus::Completed.label(), "배송 완료");

    assert_eq!(PaymentStatus::from_code("PAID"), None);
    assert_eq!(PaymentStatus::from_label("결제"), None);
    assert_eq!(DeliveryStatus::from_code("SHIPPED"), None);
}

#[test]
fn statuses_only_move_forward() {
    assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Completed));
    assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Pending));
    assert!(PaymentStatus::Completed.can_transition_to(PaymentStatus::Completed));
    assert!(!PaymentStatus::Completed.can_transition_to(PaymentStatus::Pending));

    assert!(DeliveryStatus::Preparing.can_transition_to(DeliveryStatus::Completed));
    assert!(DeliveryStatus::Preparing.can_transition_to(DeliveryStatus::Preparing));
    assert!(DeliveryStatus::Completed.can_transition_to(DeliveryStatus::Completed));
    assert!(!DeliveryStatus::Completed.can_transition_to(DeliveryStatus::Preparing));
}

#[test]
fn customer_name_pattern() {
    assert!(validation::validate_customer_name("홍길동").is_ok());
    assert!(validation::validate_customer_name("John Doe").is_ok());
    assert!(validation::validate_customer_name("홍").is_err());
    assert!(validation::validate_customer_name("abc123").is_err());
    assert!(validation::validate_customer_name("").is_err());
}

#[test]
fn customer_phone_pattern() {
    assert!(validation::validate_customer_phone("010-1234-5678").is_ok());
    assert!(validation::validate_customer_phone("01012345678").is_err());
    assert!(validation::validate_customer_phone("011-1234-5678").is_err());
    assert!(validation::validate_customer_phone("010-123-5678").is_err());
}

#[test]
fn customer_email_pattern_is_optional() {
    assert!(validation::validate_customer_email(None).is_ok());
    assert!(validation::validate_customer_email(Some("")).is_ok());
    assert!(validation::validate_customer_email(Some("a@b.co")).is_ok());
    assert!(validation::validate_customer_email(Some("not-an-email")).is_err());
    assert!(validation::validate_customer_email(Some("a b@c.co")).is_err());
}

#[test]
fn phone_normalization_strips_separators() {
    assert_eq!(validation::normalize_phone("010-1234-5678"), "01012345678");
    assert_eq!(validation::normalize_phone("010 1234 5678"), "01012345678");
    assert_eq!(validation::normalize_phone("01012345678"), "01012345678");
}

fn sample_order(name: &str, phone: &str) -> Order {
    Order {
        id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        quantity: 1,
        customer_name: name.to_string(),
        customer_phone: phone.to_string(),
        delivery_address: None,
        payment_status: PaymentStatus::Pending,
        delivery_status: DeliveryStatus::Preparing,
        order_date: Utc::now(),
        product: None,
        customer: None,
    }
}

#[test]
fn lookup_matches_on_digits_and_exact_name() {
    let orders = vec![
        sample_order("홍길동", "010-1234-5678"),
        sample_order("김철수", "01012345678"),
    ];

    let found = filter_orders_by_customer(orders.clone(), "홍길동", "01012345678");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].customer_name, "홍길동");

    let found = filter_orders_by_customer(orders.clone(), "김철수", "010-1234-5678");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].customer_name, "김철수");

    let found = filter_orders_by_customer(orders, "홍길순", "010-1234-5678");
    assert!(found.is_empty());
}

fn png_base64() -> String {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 4));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode png");
    STANDARD.encode(buf)
}

#[test]
fn upload_requires_image_and_filename() {
    let missing_image = process_upload(UploadRequest {
        image: None,
        filename: Some("photo.png".into()),
    });
    assert!(matches!(missing_image, Err(AppError::Validation(_))));

    let missing_filename = process_upload(UploadRequest {
        image: Some(png_base64()),
        filename: None,
    });
    assert!(matches!(missing_filename, Err(AppError::Validation(_))));

    let garbage = process_upload(UploadRequest {
        image: Some("not base64 at all!!".into()),
        filename: Some("photo.png".into()),
    });
    assert!(matches!(garbage, Err(AppError::Validation(_))));
}

#[test]
fn upload_returns_inline_urls() {
    let resp = process_upload(UploadRequest {
        image: Some(png_base64()),
        filename: Some("photo.png".into()),
    })
    .expect("upload");

    assert!(resp.image_url.starts_with("data:image/jpeg;base64,"));
    assert!(resp.thumbnail_url.starts_with("data:image/jpeg;base64,"));
}

#[test]
fn upload_accepts_data_url_prefix() {
    let with_prefix = format!("data:image/png;base64,{}", png_base64());
    let resp = process_upload(UploadRequest {
        image: Some(with_prefix),
        filename: Some("photo.png".into()),
    })
    .expect("upload");
    assert!(resp.image_url.starts_with("data:image/jpeg;base64,"));
}
