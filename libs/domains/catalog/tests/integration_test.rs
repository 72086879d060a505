//! Integration tests for the catalog search domain
//!
//! These tests use real MongoDB via testcontainers to ensure:
//! - Filter documents translate correctly
//! - Facet counts exclude their own dimension
//! - Sorting and pagination are deterministic
//! - Category subtree resolution works against real data

use chrono::{Duration, Utc};
use domain_catalog::*;
use ::mongodb::Database;
use test_utils::{TestDataBuilder, TestMongo, assertions::*};
use uuid::Uuid;

fn product(builder: &TestDataBuilder, n: u64, name: &str, brand: &str, price: i64) -> Product {
    Product {
        id: builder.id_n(n),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        brand: brand.to_string(),
        category_id: None,
        tags: vec![],
        price,
        discount_percentage: None,
        rating: 4.0,
        num_reviews: 10,
        stock_quantity: 5,
        is_active: true,
        is_featured: false,
        // Stagger timestamps so newest-first ordering is well defined
        created_at: Utc::now() - Duration::minutes(n as i64),
    }
}

async fn seed(db: &Database, products: &[Product]) -> MongoCatalogRepository {
    let repo = MongoCatalogRepository::new(db);
    repo.products().insert_many(products).await.unwrap();
    repo
}

// ============================================================================
// Search execution
// ============================================================================

#[tokio::test]
async fn test_empty_criteria_returns_active_products_newest_first() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_empty_criteria");
    let builder = TestDataBuilder::from_test_name("empty_criteria");

    let mut inactive = product(&builder, 3, "Hidden", "Acme", 100);
    inactive.is_active = false;

    let repo = seed(
        &db,
        &[
            product(&builder, 1, "Newer", "Acme", 100),
            product(&builder, 2, "Older", "Acme", 200),
            inactive,
        ],
    )
    .await;

    let service = SearchService::new(repo);
    let page = service
        .search(SearchCriteria::unconstrained())
        .await
        .unwrap();

    assert_eq!(page.total_count, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].name, "Newer");
    assert_eq!(page.items[1].name, "Older");
}

#[tokio::test]
async fn test_brand_and_rating_filters_with_brand_facet() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_brand_rating");
    let builder = TestDataBuilder::from_test_name("brand_rating");

    let mut a = product(&builder, 1, "Alpha", "X", 100);
    a.rating = 4.5;
    a.tags = vec!["sale".to_string()];
    let mut b = product(&builder, 2, "Beta", "Y", 200);
    b.rating = 3.0;
    let mut c = product(&builder, 3, "Gamma", "X", 50);
    c.is_active = false;

    let repo = seed(&db, &[a, b, c]).await;
    let service = SearchService::new(repo);

    let criteria = SearchCriteriaBuilder::new()
        .brands(Some("X"))
        .min_rating(Some("4"))
        .build();

    let page = service.search(criteria.clone()).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].name, "Alpha");

    // Brand facet ignores the brand filter but keeps the rating filter,
    // and still lists brands the rating filter zeroed out.
    let facets = service.available_filters(criteria).await.unwrap();
    assert_eq!(
        facets.brands,
        vec![
            FacetCount {
                value: "X".to_string(),
                count: 1
            },
            FacetCount {
                value: "Y".to_string(),
                count: 0
            },
        ]
    );
}

#[tokio::test]
async fn test_reversed_price_range_matches_straight_range() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_reversed_range");
    let builder = TestDataBuilder::from_test_name("reversed_range");

    let repo = seed(
        &db,
        &[
            product(&builder, 1, "Cheap", "Acme", 50),
            product(&builder, 2, "Mid", "Acme", 150),
            product(&builder, 3, "Dear", "Acme", 500),
        ],
    )
    .await;
    let service = SearchService::new(repo);

    let straight = SearchCriteriaBuilder::new()
        .price_range(Some("100"), Some("200"))
        .build();
    let reversed = SearchCriteriaBuilder::new()
        .price_range(Some("200"), Some("100"))
        .build();

    let a = service.search(straight).await.unwrap();
    let b = service.search(reversed).await.unwrap();

    assert_eq!(a.total_count, 1);
    assert_eq!(b.total_count, 1);
    assert_uuid_eq(a.items[0].id, b.items[0].id, "reversed range result");
}

#[tokio::test]
async fn test_pagination_concatenates_without_overlap() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_pagination");
    let builder = TestDataBuilder::from_test_name("pagination");

    let products: Vec<Product> = (1..=30)
        .map(|n| product(&builder, n, &format!("Item {n:02}"), "Acme", 100 * n as i64))
        .collect();
    let repo = seed(&db, &products).await;
    let service = SearchService::new(repo);

    let mut seen: Vec<Uuid> = Vec::new();
    for page_no in 1..=3 {
        let criteria = SearchCriteriaBuilder::new()
            .sort(Some("price_asc"))
            .paginate(Some(&page_no.to_string()), Some("12"))
            .build();
        let page = service.search(criteria).await.unwrap();
        assert_eq!(page.total_count, 30);
        assert_eq!(page.total_pages, 3);
        seen.extend(page.items.iter().map(|p| p.id));
    }

    assert_eq!(seen.len(), 30);
    let mut deduped = seen.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), 30, "pages must not overlap");
}

#[tokio::test]
async fn test_tied_sort_keys_keep_a_stable_order() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_sort_stability");
    let builder = TestDataBuilder::from_test_name("sort_stability");

    // Identical prices force every comparison onto the id tie-break
    let products: Vec<Product> = (1..=6)
        .map(|n| product(&builder, n, &format!("Twin {n}"), "Acme", 1_000))
        .collect();
    let repo = seed(&db, &products).await;
    let service = SearchService::new(repo);

    let criteria = SearchCriteriaBuilder::new().sort(Some("price_asc")).build();

    let first: Vec<Uuid> = service
        .search(criteria.clone())
        .await
        .unwrap()
        .items
        .iter()
        .map(|p| p.id)
        .collect();
    let second: Vec<Uuid> = service
        .search(criteria)
        .await
        .unwrap()
        .items
        .iter()
        .map(|p| p.id)
        .collect();

    assert_eq!(first, second, "repeated requests must agree on order");

    let mut by_id: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    by_id.sort();
    assert_eq!(first, by_id, "ties resolve by ascending id");
}

#[tokio::test]
async fn test_tag_filter_has_or_semantics() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_tags");
    let builder = TestDataBuilder::from_test_name("tag_or");

    let mut a = product(&builder, 1, "Alpha", "Acme", 100);
    a.tags = vec!["sale".to_string()];
    let mut b = product(&builder, 2, "Beta", "Acme", 200);
    b.tags = vec!["new".to_string()];
    let mut c = product(&builder, 3, "Gamma", "Acme", 300);
    c.tags = vec!["eco".to_string()];

    let repo = seed(&db, &[a, b, c]).await;
    let service = SearchService::new(repo);

    let criteria = SearchCriteriaBuilder::new().tags(Some("sale,new")).build();
    let page = service.search(criteria).await.unwrap();
    assert_eq!(page.total_count, 2);
}

// ============================================================================
// Facets
// ============================================================================

#[tokio::test]
async fn test_price_buckets_ignore_price_filter() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_price_buckets");
    let builder = TestDataBuilder::from_test_name("price_buckets");

    let repo = seed(
        &db,
        &[
            product(&builder, 1, "Budget", "Acme", 1_000),
            product(&builder, 2, "Mid", "Acme", 5_000),
            product(&builder, 3, "Premium", "Acme", 150_000),
        ],
    )
    .await;
    let service = SearchService::new(repo);

    // A narrow price filter must not empty the other buckets.
    let criteria = SearchCriteriaBuilder::new()
        .price_range(Some("0"), Some("2000"))
        .build();
    let facets = service.available_filters(criteria).await.unwrap();

    let counts: Vec<u64> = facets.price_buckets.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![1, 1, 0, 0, 1]);

    let top = facets.price_buckets.last().unwrap();
    assert_eq!(top.min, 100_000);
    assert_eq!(top.max, None);
}

#[tokio::test]
async fn test_rating_thresholds_are_cumulative() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_rating_thresholds");
    let builder = TestDataBuilder::from_test_name("rating_thresholds");

    let mut a = product(&builder, 1, "Great", "Acme", 100);
    a.rating = 4.5;
    let mut b = product(&builder, 2, "Fine", "Acme", 200);
    b.rating = 3.2;
    let mut c = product(&builder, 3, "Poor", "Acme", 300);
    c.rating = 1.5;

    let repo = seed(&db, &[a, b, c]).await;
    let service = SearchService::new(repo);

    let facets = service
        .available_filters(SearchCriteria::unconstrained())
        .await
        .unwrap();

    let by_threshold: Vec<(i64, u64)> = facets
        .rating_thresholds
        .iter()
        .map(|t| (t.min_rating, t.count))
        .collect();
    assert_eq!(by_threshold, vec![(4, 1), (3, 2), (2, 2), (1, 3)]);
}

#[tokio::test]
async fn test_discount_and_stock_counts() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_discount_stock");
    let builder = TestDataBuilder::from_test_name("discount_stock");

    let mut a = product(&builder, 1, "Discounted", "Acme", 100);
    a.discount_percentage = Some(25);
    let mut b = product(&builder, 2, "Sold Out", "Acme", 200);
    b.stock_quantity = 0;
    let c = product(&builder, 3, "Plain", "Acme", 300);

    let repo = seed(&db, &[a, b, c]).await;
    let service = SearchService::new(repo);

    let facets = service
        .available_filters(SearchCriteria::unconstrained())
        .await
        .unwrap();
    assert_eq!(facets.discounted_count, 1);
    assert_eq!(facets.in_stock_count, 2);
}

#[tokio::test]
async fn test_tag_facet_returns_most_frequent_first() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_tag_facet");
    let builder = TestDataBuilder::from_test_name("tag_facet");

    let mut products = Vec::new();
    for n in 1..=5u64 {
        let mut p = product(&builder, n, &format!("P{n}"), "Acme", 100);
        p.tags = if n <= 3 {
            vec!["popular".to_string()]
        } else {
            vec!["niche".to_string()]
        };
        products.push(p);
    }

    let repo = seed(&db, &products).await;
    let service = SearchService::new(repo);

    let facets = service
        .available_filters(SearchCriteria::unconstrained())
        .await
        .unwrap();
    assert_eq!(facets.tags[0].value, "popular");
    assert_eq!(facets.tags[0].count, 3);
    assert_eq!(facets.tags[1].value, "niche");
    assert_eq!(facets.tags[1].count, 2);
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_category_filter_includes_descendants() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_category_subtree");
    let builder = TestDataBuilder::from_test_name("category_subtree");

    let root = builder.id_n(100);
    let child = builder.id_n(101);
    let grandchild = builder.id_n(102);
    let unrelated = builder.id_n(103);

    let repo = MongoCatalogRepository::new(&db);
    repo.categories()
        .insert_many(&[
            Category {
                id: root,
                name: "Clothing".to_string(),
                slug: "clothing".to_string(),
                parent_id: None,
            },
            Category {
                id: child,
                name: "Shoes".to_string(),
                slug: "shoes".to_string(),
                parent_id: Some(root),
            },
            Category {
                id: grandchild,
                name: "Running Shoes".to_string(),
                slug: "running-shoes".to_string(),
                parent_id: Some(child),
            },
            Category {
                id: unrelated,
                name: "Garden".to_string(),
                slug: "garden".to_string(),
                parent_id: None,
            },
        ])
        .await
        .unwrap();

    let mut in_root = product(&builder, 1, "Jacket", "Acme", 100);
    in_root.category_id = Some(root);
    let mut in_grandchild = product(&builder, 2, "Trail Runner", "Acme", 200);
    in_grandchild.category_id = Some(grandchild);
    let mut elsewhere = product(&builder, 3, "Rake", "Acme", 300);
    elsewhere.category_id = Some(unrelated);

    repo.products()
        .insert_many(&[in_root, in_grandchild, elsewhere])
        .await
        .unwrap();

    let service = SearchService::new(repo);
    let criteria = SearchCriteriaBuilder::new()
        .category(Some(&root.to_string()))
        .build();

    let page = service.search(criteria).await.unwrap();
    assert_eq!(page.total_count, 2);
}

#[tokio::test]
async fn test_unknown_category_returns_empty_page_not_error() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_unknown_category");
    let builder = TestDataBuilder::from_test_name("unknown_category");

    let repo = seed(&db, &[product(&builder, 1, "Widget", "Acme", 100)]).await;
    let service = SearchService::new(repo);

    let criteria = SearchCriteriaBuilder::new()
        .category(Some(&Uuid::new_v4().to_string()))
        .build();

    let page = service.search(criteria).await.unwrap();
    assert_eq!(page.total_count, 0);
    assert!(page.items.is_empty());
}

// ============================================================================
// Suggestions
// ============================================================================

#[tokio::test]
async fn test_suggestions_match_case_insensitively_and_cap_at_ten() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_suggestions");
    let builder = TestDataBuilder::from_test_name("suggestions");

    let mut products: Vec<Product> = (1..=12)
        .map(|n| product(&builder, n, &format!("Sandal {n:02}"), "Acme", 100))
        .collect();
    let mut inactive = product(&builder, 13, "Sandal Hidden", "Acme", 100);
    inactive.is_active = false;
    products.push(inactive);

    let repo = seed(&db, &products).await;
    let service = SearchService::new(repo);

    let matches = service.suggest("SAND").await.unwrap();
    assert_eq!(matches.len(), 10);
    assert!(matches.iter().all(|s| s.name.starts_with("Sandal")));

    // One character is below the minimum
    assert!(service.suggest("s").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_suggestions_match_brand_and_tags() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_suggestion_fields");
    let builder = TestDataBuilder::from_test_name("suggestion_fields");

    let by_brand = product(&builder, 1, "Plain Shirt", "Zephyr", 100);
    let mut by_tag = product(&builder, 2, "Plain Pants", "Acme", 200);
    by_tag.tags = vec!["zephyr-line".to_string()];
    let unmatched = product(&builder, 3, "Plain Hat", "Acme", 300);

    let repo = seed(&db, &[by_brand, by_tag, unmatched]).await;
    let service = SearchService::new(repo);

    let matches = service.suggest("zephyr").await.unwrap();
    assert_eq!(matches.len(), 2);

    let first = assert_some(matches.first(), "expected a brand match");
    assert!(first.name.starts_with("Plain"));
}
