//! Search API routes

use axum::Router;
use domain_catalog::{MongoCatalogRepository, SearchService, handlers};

use crate::state::AppState;

/// Create search router
pub fn router(state: &AppState) -> Router {
    let repository = MongoCatalogRepository::new(&state.db);
    let service = SearchService::new(repository);
    handlers::router(service)
}

/// Initialize catalog indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    let repository = MongoCatalogRepository::new(&state.db);
    repository.init_indexes().await?;
    Ok(())
}
