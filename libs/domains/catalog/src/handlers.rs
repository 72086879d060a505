//! HTTP handlers for the catalog search API

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_helpers::errors::responses::{InternalServerErrorResponse, ServiceUnavailableResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::criteria::{SearchCriteria, SearchCriteriaBuilder};
use crate::error::CatalogResult;
use crate::models::{
    FacetCount, FilterFacets, PriceBucketCount, Product, RatingThresholdCount, SearchPage,
    Suggestion,
};
use crate::repository::CatalogRepository;
use crate::service::SearchService;

/// OpenAPI documentation for the search API
#[derive(OpenApi)]
#[openapi(
    paths(search_products, available_filters, suggestions),
    components(
        schemas(
            Product, SearchPage, FilterFacets, FacetCount, PriceBucketCount,
            RatingThresholdCount, Suggestion,
            ApiEnvelope<SearchPage>, ApiEnvelope<FilterFacets>, ApiEnvelope<Vec<Suggestion>>
        ),
        responses(InternalServerErrorResponse, ServiceUnavailableResponse)
    ),
    tags(
        (name = "Search", description = "Product search and filtering endpoints")
    )
)]
pub struct ApiDoc;

/// Standard success envelope for search responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiEnvelope<T> {
    /// Always true for successful responses
    pub success: bool,
    /// The response payload
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Raw query-string parameters for search and filter endpoints
///
/// Everything is optional and string-typed; normalization happens in
/// [`SearchCriteriaBuilder`], so malformed values degrade to defaults
/// instead of producing a 400.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text keyword matched against name, brand and tags
    pub keyword: Option<String>,
    /// Category id; matches the category and all of its descendants
    pub category: Option<String>,
    /// Inclusive minimum price in minor currency units
    pub min_price: Option<String>,
    /// Inclusive maximum price in minor currency units
    pub max_price: Option<String>,
    /// Comma-separated brand list
    pub brands: Option<String>,
    /// Minimum rating (0-5)
    pub rating: Option<String>,
    /// Minimum discount percentage (1-100)
    pub discount: Option<String>,
    /// "true"/"1" to restrict to in-stock products
    pub in_stock: Option<String>,
    /// "true"/"1" to restrict to featured products
    pub featured: Option<String>,
    /// Comma-separated tag list
    pub tags: Option<String>,
    /// Sort key (newest, price_asc, price_desc, rating_desc, popularity,
    /// discount_desc)
    pub sort: Option<String>,
    /// 1-based page number
    pub page: Option<String>,
    /// Page size (max 100)
    pub limit: Option<String>,
}

impl SearchParams {
    /// Normalize raw parameters into immutable search criteria
    pub fn into_criteria(self) -> SearchCriteria {
        SearchCriteriaBuilder::new()
            .keyword(self.keyword.as_deref())
            .category(self.category.as_deref())
            .price_range(self.min_price.as_deref(), self.max_price.as_deref())
            .brands(self.brands.as_deref())
            .min_rating(self.rating.as_deref())
            .min_discount(self.discount.as_deref())
            .in_stock_only(self.in_stock.as_deref())
            .featured_only(self.featured.as_deref())
            .tags(self.tags.as_deref())
            .sort(self.sort.as_deref())
            .paginate(self.page.as_deref(), self.limit.as_deref())
            .build()
    }
}

/// Query parameters for the suggestions endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestionParams {
    /// Typeahead query, minimum 2 characters
    pub q: Option<String>,
}

/// Create the search router with all HTTP endpoints
pub fn router<R: CatalogRepository + 'static>(service: SearchService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(search_products))
        .route("/filters", get(available_filters))
        .route("/suggestions", get(suggestions))
        .with_state(shared_service)
}

/// Search products with accumulated filters
#[utoipa::path(
    get,
    path = "",
    tag = "Search",
    params(SearchParams),
    responses(
        (status = 200, description = "Paginated search results", body = ApiEnvelope<SearchPage>),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn search_products<R: CatalogRepository>(
    State(service): State<Arc<SearchService<R>>>,
    Query(params): Query<SearchParams>,
) -> CatalogResult<Json<ApiEnvelope<SearchPage>>> {
    let page = service.search(params.into_criteria()).await?;
    Ok(Json(ApiEnvelope::new(page)))
}

/// Facet counts for the current partial filter state
#[utoipa::path(
    get,
    path = "/filters",
    tag = "Search",
    params(SearchParams),
    responses(
        (status = 200, description = "Available filter facets", body = ApiEnvelope<FilterFacets>),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn available_filters<R: CatalogRepository>(
    State(service): State<Arc<SearchService<R>>>,
    Query(params): Query<SearchParams>,
) -> CatalogResult<Json<ApiEnvelope<FilterFacets>>> {
    let facets = service.available_filters(params.into_criteria()).await?;
    Ok(Json(ApiEnvelope::new(facets)))
}

/// Typeahead product suggestions
#[utoipa::path(
    get,
    path = "/suggestions",
    tag = "Search",
    params(SuggestionParams),
    responses(
        (status = 200, description = "Lightweight product matches", body = ApiEnvelope<Vec<Suggestion>>),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn suggestions<R: CatalogRepository>(
    State(service): State<Arc<SearchService<R>>>,
    Query(params): Query<SuggestionParams>,
) -> CatalogResult<Json<ApiEnvelope<Vec<Suggestion>>>> {
    let matches = service.suggest(params.q.as_deref().unwrap_or("")).await?;
    Ok(Json(ApiEnvelope::new(matches)))
}
