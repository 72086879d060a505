//! Handler tests for the catalog search domain
//!
//! These tests verify the HTTP surface:
//! - Query-string deserialization and normalization
//! - The { success, data } response envelope
//! - HTTP status codes for degraded and error-free paths

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use domain_catalog::*;
use http_body_util::BodyExt;
use serde_json::Value;
use test_utils::{TestDataBuilder, TestMongo};
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn product(builder: &TestDataBuilder, n: u64, name: &str, brand: &str, rating: f64) -> Product {
    Product {
        id: builder.id_n(n),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        brand: brand.to_string(),
        category_id: None,
        tags: vec![],
        price: 100 * n as i64,
        discount_percentage: None,
        rating,
        num_reviews: 10,
        stock_quantity: 5,
        is_active: true,
        is_featured: false,
        created_at: Utc::now(),
    }
}

async fn app_with(db_name: &str, products: Vec<Product>) -> (TestMongo, axum::Router) {
    let mongo = TestMongo::new().await;
    let db = mongo.database(db_name);
    let repo = MongoCatalogRepository::new(&db);
    if !products.is_empty() {
        repo.products().insert_many(&products).await.unwrap();
    }
    let app = handlers::router(SearchService::new(repo));
    (mongo, app)
}

#[tokio::test]
async fn test_search_handler_wraps_results_in_envelope() {
    let builder = TestDataBuilder::from_test_name("handler_envelope");
    let (_mongo, app) = app_with(
        "handler_envelope",
        vec![
            product(&builder, 1, "Alpha", "X", 4.5),
            product(&builder, 2, "Beta", "Y", 3.0),
        ],
    )
    .await;

    let request = Request::builder()
        .uri("/?brands=X&rating=4")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total_count"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "Alpha");
}

#[tokio::test]
async fn test_search_handler_tolerates_malformed_parameters() {
    let builder = TestDataBuilder::from_test_name("handler_malformed");
    let (_mongo, app) = app_with(
        "handler_malformed",
        vec![product(&builder, 1, "Widget", "Acme", 4.0)],
    )
    .await;

    // Garbage values degrade to defaults rather than producing a 400
    let request = Request::builder()
        .uri("/?minPrice=banana&rating=lots&page=-2&limit=huge&sort=bogus")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["page_size"], 12);
    assert_eq!(body["data"]["total_count"], 1);
}

#[tokio::test]
async fn test_filters_handler_returns_all_facet_dimensions() {
    let builder = TestDataBuilder::from_test_name("handler_facets");
    let (_mongo, app) = app_with(
        "handler_facets",
        vec![
            product(&builder, 1, "Alpha", "X", 4.5),
            product(&builder, 2, "Beta", "Y", 3.0),
        ],
    )
    .await;

    let request = Request::builder()
        .uri("/filters")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert!(data["brands"].is_array());
    assert_eq!(data["price_buckets"].as_array().unwrap().len(), 5);
    assert_eq!(data["rating_thresholds"].as_array().unwrap().len(), 4);
    assert!(data["tags"].is_array());
    assert_eq!(data["in_stock_count"], 2);
    assert_eq!(data["discounted_count"], 0);
}

#[tokio::test]
async fn test_suggestions_handler_gates_short_queries() {
    let builder = TestDataBuilder::from_test_name("handler_suggestions");
    let (_mongo, app) = app_with(
        "handler_suggestions",
        vec![product(&builder, 1, "Sandal", "Acme", 4.0)],
    )
    .await;

    let request = Request::builder()
        .uri("/suggestions?q=s")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_suggestions_handler_returns_lightweight_matches() {
    let builder = TestDataBuilder::from_test_name("handler_suggestion_shape");
    let (_mongo, app) = app_with(
        "handler_suggestion_shape",
        vec![product(&builder, 1, "Sandal", "Acme", 4.0)],
    )
    .await;

    let request = Request::builder()
        .uri("/suggestions?q=sa")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    let first = &body["data"][0];
    assert_eq!(first["name"], "Sandal");
    assert_eq!(first["brand"], "Acme");
    assert_eq!(first["slug"], "sandal");
    assert!(first.get("rating").is_none(), "suggestions stay lightweight");
}

#[tokio::test]
async fn test_empty_catalog_returns_empty_page() {
    let (_mongo, app) = app_with("handler_empty", vec![]).await;

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["data"]["total_count"], 0);
    assert_eq!(body["data"]["total_pages"], 0);
    assert_eq!(body["data"]["items"], serde_json::json!([]));
}
