//! MongoDB implementation of CatalogRepository

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::{FindOptions, IndexOptions},
};
use tracing::instrument;
use uuid::Uuid;

use crate::criteria::SearchCriteria;
use crate::error::CatalogResult;
use crate::models::{
    Category, FacetCount, PriceBucketCount, Product, RatingThresholdCount, Suggestion,
};
use crate::query::{
    FacetDimension, PRICE_BUCKETS, RATING_THRESHOLDS, SUGGESTION_LIMIT, TAG_FACET_LIMIT,
    filter_document, filter_document_excluding, price_bucket_filter, sort_document,
};
use crate::repository::CatalogRepository;

/// MongoDB implementation of the CatalogRepository
pub struct MongoCatalogRepository {
    products: Collection<Product>,
    categories: Collection<Category>,
}

impl MongoCatalogRepository {
    /// Create a new MongoCatalogRepository on the default collections
    pub fn new(db: &Database) -> Self {
        Self {
            products: db.collection::<Product>("products"),
            categories: db.collection::<Category>("categories"),
        }
    }

    /// Create a new MongoCatalogRepository with custom collection names
    pub fn with_collections(db: &Database, products: &str, categories: &str) -> Self {
        Self {
            products: db.collection::<Product>(products),
            categories: db.collection::<Category>(categories),
        }
    }

    /// Initialize indexes for optimal query performance
    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let product_indexes = vec![
            // Default listing order
            IndexModel::builder()
                .keys(doc! { "is_active": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_active_created".to_string())
                        .build(),
                )
                .build(),
            // Price range queries and price sorts
            IndexModel::builder()
                .keys(doc! { "is_active": 1, "price": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_active_price".to_string())
                        .build(),
                )
                .build(),
            // Rating filter and sort
            IndexModel::builder()
                .keys(doc! { "is_active": 1, "rating": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_active_rating".to_string())
                        .build(),
                )
                .build(),
            // Brand facet and filter
            IndexModel::builder()
                .keys(doc! { "brand": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_brand".to_string())
                        .build(),
                )
                .build(),
            // Tag facet and filter (multikey)
            IndexModel::builder()
                .keys(doc! { "tags": 1 })
                .options(IndexOptions::builder().name("idx_tags".to_string()).build())
                .build(),
            // Category subtree filter
            IndexModel::builder()
                .keys(doc! { "category_id": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .build(),
                )
                .build(),
        ];
        self.products.create_indexes(product_indexes).await?;

        let category_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "parent_id": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_parent".to_string())
                        .build(),
                )
                .build(),
        ];
        self.categories.create_indexes(category_indexes).await?;

        tracing::info!("Catalog indexes created successfully");
        Ok(())
    }

    /// Get the underlying products collection for advanced operations
    pub fn products(&self) -> &Collection<Product> {
        &self.products
    }

    /// Get the underlying categories collection
    pub fn categories(&self) -> &Collection<Category> {
        &self.categories
    }

    /// Run a $group aggregation and collect `_id -> count` pairs
    async fn grouped_counts(&self, pipeline: Vec<Document>) -> CatalogResult<Vec<(String, u64)>> {
        let mut cursor = self.products.aggregate(pipeline).await?;
        let mut out = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            if let Ok(value) = doc.get_str("_id") {
                out.push((value.to_string(), count_field(&doc)));
            }
        }
        Ok(out)
    }
}

/// Read the `count` field of a $group result, tolerant of bson integer
/// width
fn count_field(doc: &Document) -> u64 {
    match doc.get("count") {
        Some(Bson::Int32(n)) => *n as u64,
        Some(Bson::Int64(n)) => *n as u64,
        Some(Bson::Double(n)) => *n as u64,
        _ => 0,
    }
}

#[async_trait]
impl CatalogRepository for MongoCatalogRepository {
    #[instrument(skip(self, criteria))]
    async fn count(&self, criteria: &SearchCriteria) -> CatalogResult<u64> {
        let filter = filter_document(criteria);
        let count = self.products.count_documents(filter).await?;
        Ok(count)
    }

    #[instrument(skip(self, criteria), fields(page = criteria.page, page_size = criteria.page_size))]
    async fn fetch_page(&self, criteria: &SearchCriteria) -> CatalogResult<Vec<Product>> {
        let filter = filter_document(criteria);

        let options = FindOptions::builder()
            .sort(sort_document(criteria.sort))
            .skip(criteria.skip())
            .limit(criteria.page_size as i64)
            .build();

        let cursor = self.products.find(filter).with_options(options).await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }

    #[instrument(skip(self, criteria))]
    async fn brand_counts(&self, criteria: &SearchCriteria) -> CatalogResult<Vec<FacetCount>> {
        // The value universe is every brand carried by an active product,
        // so brands zeroed out by the other filters still show up.
        let universe = self
            .products
            .distinct("brand", doc! { "is_active": true })
            .await?;

        let pipeline = vec![
            doc! { "$match": filter_document_excluding(criteria, FacetDimension::Brand) },
            doc! { "$group": { "_id": "$brand", "count": { "$sum": 1 } } },
        ];
        let counts: HashMap<String, u64> =
            self.grouped_counts(pipeline).await?.into_iter().collect();

        let mut brands: Vec<String> = universe
            .into_iter()
            .filter_map(|b| b.as_str().map(str::to_string))
            .collect();
        brands.sort();

        Ok(brands
            .into_iter()
            .map(|value| {
                let count = counts.get(&value).copied().unwrap_or(0);
                FacetCount { value, count }
            })
            .collect())
    }

    #[instrument(skip(self, criteria))]
    async fn price_bucket_counts(
        &self,
        criteria: &SearchCriteria,
    ) -> CatalogResult<Vec<PriceBucketCount>> {
        let base = filter_document_excluding(criteria, FacetDimension::Price);

        let counts = futures::future::try_join_all(PRICE_BUCKETS.iter().map(|(min, max)| {
            let filter = price_bucket_filter(base.clone(), *min, *max);
            async move { self.products.count_documents(filter).await }
        }))
        .await?;

        Ok(PRICE_BUCKETS
            .iter()
            .zip(counts)
            .map(|(&(min, max), count)| PriceBucketCount { min, max, count })
            .collect())
    }

    #[instrument(skip(self, criteria))]
    async fn rating_counts(
        &self,
        criteria: &SearchCriteria,
    ) -> CatalogResult<Vec<RatingThresholdCount>> {
        let base = filter_document_excluding(criteria, FacetDimension::Rating);

        let counts = futures::future::try_join_all(RATING_THRESHOLDS.iter().map(|threshold| {
            let mut filter = base.clone();
            filter.insert("rating", doc! { "$gte": *threshold });
            async move { self.products.count_documents(filter).await }
        }))
        .await?;

        Ok(RATING_THRESHOLDS
            .iter()
            .zip(counts)
            .map(|(&min_rating, count)| RatingThresholdCount { min_rating, count })
            .collect())
    }

    #[instrument(skip(self, criteria))]
    async fn discounted_count(&self, criteria: &SearchCriteria) -> CatalogResult<u64> {
        let mut filter = filter_document_excluding(criteria, FacetDimension::Discount);
        filter.insert("discount_percentage", doc! { "$gt": 0 });
        let count = self.products.count_documents(filter).await?;
        Ok(count)
    }

    #[instrument(skip(self, criteria))]
    async fn in_stock_count(&self, criteria: &SearchCriteria) -> CatalogResult<u64> {
        let mut filter = filter_document_excluding(criteria, FacetDimension::Stock);
        filter.insert("stock_quantity", doc! { "$gt": 0 });
        let count = self.products.count_documents(filter).await?;
        Ok(count)
    }

    #[instrument(skip(self, criteria))]
    async fn tag_counts(&self, criteria: &SearchCriteria) -> CatalogResult<Vec<FacetCount>> {
        let pipeline = vec![
            doc! { "$match": filter_document_excluding(criteria, FacetDimension::Tag) },
            doc! { "$unwind": "$tags" },
            doc! { "$group": { "_id": "$tags", "count": { "$sum": 1 } } },
            doc! { "$sort": { "count": -1, "_id": 1 } },
            doc! { "$limit": TAG_FACET_LIMIT },
        ];

        let counts = self.grouped_counts(pipeline).await?;
        Ok(counts
            .into_iter()
            .map(|(value, count)| FacetCount { value, count })
            .collect())
    }

    #[instrument(skip(self))]
    async fn suggest(&self, query: &str) -> CatalogResult<Vec<Suggestion>> {
        let pattern = regex::escape(query);
        let filter = doc! {
            "is_active": true,
            "$or": [
                { "name": { "$regex": &pattern, "$options": "i" } },
                { "brand": { "$regex": &pattern, "$options": "i" } },
                { "tags": { "$regex": &pattern, "$options": "i" } },
            ],
        };

        let options = FindOptions::builder()
            .sort(doc! { "name": 1, "_id": 1 })
            .limit(SUGGESTION_LIMIT)
            .build();

        let cursor = self.products.find(filter).with_options(options).await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products.into_iter().map(Suggestion::from).collect())
    }

    #[instrument(skip(self))]
    async fn category_subtree(&self, root: Uuid) -> CatalogResult<Vec<Uuid>> {
        let root_filter = doc! { "_id": to_bson(&root).unwrap_or(Bson::Null) };
        if self.categories.find_one(root_filter).await?.is_none() {
            return Ok(Vec::new());
        }

        let mut visited: HashSet<Uuid> = HashSet::from([root]);
        let mut frontier = vec![root];

        // Breadth-first walk; the visited set guards against cycles in
        // malformed category data.
        while !frontier.is_empty() {
            let parents: Vec<Bson> = frontier
                .iter()
                .map(|id| to_bson(id).unwrap_or(Bson::Null))
                .collect();

            let cursor = self
                .categories
                .find(doc! { "parent_id": { "$in": parents } })
                .await?;
            let children: Vec<Category> = cursor.try_collect().await?;

            frontier = children
                .into_iter()
                .filter(|c| visited.insert(c.id))
                .map(|c| c.id)
                .collect();
        }

        let mut ids: Vec<Uuid> = visited.into_iter().collect();
        ids.sort();
        Ok(ids)
    }
}
