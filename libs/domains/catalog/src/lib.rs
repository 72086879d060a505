//! Catalog Search Domain
//!
//! This module provides the product search and filtering engine for the
//! storefront, backed by MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (search, filters, suggestions)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Criteria resolution, concurrent query fan-out
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Criteria  │  ← Normalized filter state + query translation
//! └─────────────┘
//! ```
//!
//! Filter input from the HTTP layer is normalized into an immutable
//! [`SearchCriteria`] by [`SearchCriteriaBuilder`]; bad input is clamped or
//! defaulted, never rejected. The criteria value is then translated into
//! MongoDB filter documents by the [`query`] module, and the service layer
//! runs the count, page fetch and facet aggregations concurrently.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     handlers,
//!     mongodb::MongoCatalogRepository,
//!     service::SearchService,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a MongoDB client
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("mydb");
//!
//! // Create a repository and service
//! let repository = MongoCatalogRepository::new(&db);
//! let service = SearchService::new(repository);
//!
//! // Create Axum router
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod criteria;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod query;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use criteria::{SearchCriteria, SearchCriteriaBuilder, SortKey};
pub use error::{CatalogError, CatalogResult};
pub use handlers::ApiDoc;
pub use models::{
    Category, FacetCount, FilterFacets, PriceBucketCount, Product, RatingThresholdCount,
    SearchPage, Suggestion,
};
pub use mongodb::MongoCatalogRepository;
pub use repository::CatalogRepository;
pub use service::SearchService;
