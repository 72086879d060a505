use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Product entity - represents a catalog product stored in MongoDB
///
/// The catalog is read-only to the search domain; writes happen elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Product name
    pub name: String,
    /// URL-friendly slug
    pub slug: String,
    /// Brand name
    pub brand: String,
    /// Owning category, if assigned
    pub category_id: Option<Uuid>,
    /// Tags for search and filtering
    #[serde(default)]
    pub tags: Vec<String>,
    /// Price in minor currency units (cents)
    pub price: i64,
    /// Discount percentage (0-100), absent when not discounted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<i64>,
    /// Average rating (0-5, one decimal)
    pub rating: f64,
    /// Number of customer reviews
    pub num_reviews: i64,
    /// Current stock quantity
    pub stock_quantity: i32,
    /// Whether the product is visible in public search
    pub is_active: bool,
    /// Whether the product is featured
    pub is_featured: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Category entity - node in the catalog's category tree
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Category name
    pub name: String,
    /// URL-friendly slug
    pub slug: String,
    /// Parent category, absent for root categories
    pub parent_id: Option<Uuid>,
}

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchPage {
    /// Products on this page, in sort order
    pub items: Vec<Product>,
    /// Count of all matching products before pagination
    pub total_count: u64,
    /// 1-based page number
    pub page: u32,
    /// Requested page size
    pub page_size: u32,
    /// Ceiling of total_count / page_size
    pub total_pages: u64,
}

impl SearchPage {
    /// Assemble a page from a fetched slice and a total count
    pub fn new(items: Vec<Product>, total_count: u64, page: u32, page_size: u32) -> Self {
        let total_pages = total_count.div_ceil(page_size.max(1) as u64);
        Self {
            items,
            total_count,
            page,
            page_size,
            total_pages,
        }
    }
}

/// A facet value with its count of matching products
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FacetCount {
    /// The facet value (brand name or tag)
    pub value: String,
    /// Number of matching products carrying this value
    pub count: u64,
}

/// Count of matching products inside a fixed price bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceBucketCount {
    /// Inclusive lower bound in minor currency units
    pub min: i64,
    /// Exclusive upper bound, absent for the open-ended top bucket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Number of matching products in the bucket
    pub count: u64,
}

/// Count of matching products at or above a rating threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RatingThresholdCount {
    /// Minimum rating (products with rating >= this are counted)
    pub min_rating: i64,
    /// Number of matching products at or above the threshold
    pub count: u64,
}

/// Facet metadata for the current partial filter state
///
/// Each dimension's counts are computed with every accumulated filter
/// applied except the dimension's own, so a selected value never zeroes
/// out its own facet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FilterFacets {
    /// Distinct brands with counts
    pub brands: Vec<FacetCount>,
    /// Fixed price buckets with counts
    pub price_buckets: Vec<PriceBucketCount>,
    /// Fixed rating thresholds with counts
    pub rating_thresholds: Vec<RatingThresholdCount>,
    /// Number of matching products with any discount
    pub discounted_count: u64,
    /// Number of matching products currently in stock
    pub in_stock_count: u64,
    /// Most frequent tags with counts
    pub tags: Vec<FacetCount>,
}

/// Lightweight product match for typeahead suggestions
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Suggestion {
    /// Product ID
    pub id: Uuid,
    /// Product name
    pub name: String,
    /// URL-friendly slug
    pub slug: String,
    /// Brand name
    pub brand: String,
    /// Price in minor currency units
    pub price: i64,
}

impl From<Product> for Suggestion {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            slug: product.slug,
            brand: product.brand,
            price: product.price,
        }
    }
}
