//! Search service layer
//!
//! Resolves category filters to subtrees, then fans the independent
//! read queries out concurrently. All business rules that need I/O live
//! here; pure normalization stays in the criteria builder.

use std::sync::Arc;

use tracing::instrument;

use crate::criteria::SearchCriteria;
use crate::error::CatalogResult;
use crate::models::{FilterFacets, SearchPage, Suggestion};
use crate::query::MIN_SUGGESTION_CHARS;
use crate::repository::CatalogRepository;

/// Search service orchestrating catalog read queries
pub struct SearchService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> Clone for SearchService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: CatalogRepository> SearchService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn from_arc(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Expand a requested category into its subtree of category ids
    ///
    /// An unknown category resolves to an empty id set, which matches
    /// nothing. That is deliberate: a stale category link returns an
    /// empty result page, not an error.
    async fn resolve_criteria(&self, mut criteria: SearchCriteria) -> CatalogResult<SearchCriteria> {
        if criteria.needs_category_resolution()
            && let Some(root) = criteria.category_id
        {
            let subtree = self.repository.category_subtree(root).await?;
            criteria.category_ids = Some(subtree);
        }
        Ok(criteria)
    }

    /// Execute a search: total count and page slice run concurrently
    #[instrument(skip(self, criteria), fields(page = criteria.page))]
    pub async fn search(&self, criteria: SearchCriteria) -> CatalogResult<SearchPage> {
        let criteria = self.resolve_criteria(criteria).await?;

        let (total_count, items) = tokio::try_join!(
            self.repository.count(&criteria),
            self.repository.fetch_page(&criteria),
        )?;

        Ok(SearchPage::new(
            items,
            total_count,
            criteria.page,
            criteria.page_size,
        ))
    }

    /// Compute facet metadata for the current partial filter state
    ///
    /// Six independent queries, each excluding its own dimension from
    /// the accumulated filters, run concurrently.
    #[instrument(skip(self, criteria))]
    pub async fn available_filters(&self, criteria: SearchCriteria) -> CatalogResult<FilterFacets> {
        let criteria = self.resolve_criteria(criteria).await?;

        let (brands, price_buckets, rating_thresholds, discounted_count, in_stock_count, tags) =
            tokio::try_join!(
                self.repository.brand_counts(&criteria),
                self.repository.price_bucket_counts(&criteria),
                self.repository.rating_counts(&criteria),
                self.repository.discounted_count(&criteria),
                self.repository.in_stock_count(&criteria),
                self.repository.tag_counts(&criteria),
            )?;

        Ok(FilterFacets {
            brands,
            price_buckets,
            rating_thresholds,
            discounted_count,
            in_stock_count,
            tags,
        })
    }

    /// Typeahead suggestions; queries shorter than the minimum return
    /// an empty list without touching the repository
    #[instrument(skip(self))]
    pub async fn suggest(&self, query: &str) -> CatalogResult<Vec<Suggestion>> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_SUGGESTION_CHARS {
            return Ok(Vec::new());
        }
        self.repository.suggest(trimmed).await
    }
}
