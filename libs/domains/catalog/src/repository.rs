use crate::criteria::SearchCriteria;
use crate::error::CatalogResult;
use crate::models::{FacetCount, PriceBucketCount, Product, RatingThresholdCount, Suggestion};
use async_trait::async_trait;
use uuid::Uuid;

/// Read-only data access for the catalog search domain
///
/// Each method maps to one independent MongoDB query; the service layer
/// fans them out concurrently. Facet methods take the full criteria and
/// exclude their own dimension internally.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Count products matching the criteria
    async fn count(&self, criteria: &SearchCriteria) -> CatalogResult<u64>;

    /// Fetch one sorted, paginated slice of matching products
    async fn fetch_page(&self, criteria: &SearchCriteria) -> CatalogResult<Vec<Product>>;

    /// Per-brand counts with the brand filter excluded
    async fn brand_counts(&self, criteria: &SearchCriteria) -> CatalogResult<Vec<FacetCount>>;

    /// Counts for the fixed price buckets with the price filter excluded
    async fn price_bucket_counts(
        &self,
        criteria: &SearchCriteria,
    ) -> CatalogResult<Vec<PriceBucketCount>>;

    /// Counts at each rating threshold with the rating filter excluded
    async fn rating_counts(
        &self,
        criteria: &SearchCriteria,
    ) -> CatalogResult<Vec<RatingThresholdCount>>;

    /// Count of discounted matches with the discount filter excluded
    async fn discounted_count(&self, criteria: &SearchCriteria) -> CatalogResult<u64>;

    /// Count of in-stock matches with the stock filter excluded
    async fn in_stock_count(&self, criteria: &SearchCriteria) -> CatalogResult<u64>;

    /// Most frequent tags among matches with the tag filter excluded
    async fn tag_counts(&self, criteria: &SearchCriteria) -> CatalogResult<Vec<FacetCount>>;

    /// Typeahead matches for a normalized query string
    async fn suggest(&self, query: &str) -> CatalogResult<Vec<Suggestion>>;

    /// All category ids in the subtree rooted at `root`, including the
    /// root itself. Unknown root yields an empty vec.
    async fn category_subtree(&self, root: Uuid) -> CatalogResult<Vec<Uuid>>;
}
