//! Normalized search criteria and the builder that produces them.
//!
//! The builder accepts raw query-string values and normalizes them:
//! unparseable or out-of-range input is clamped or defaulted, never
//! rejected. The resulting [`SearchCriteria`] is immutable; query
//! translation and execution read it without further validation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Default page size when none (or an invalid one) is requested
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Upper bound on page size to keep payloads bounded
pub const MAX_PAGE_SIZE: u32 = 100;

/// Recognized sort orders
///
/// Every key breaks ties by id ascending so pagination is stable across
/// requests with identical filters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortKey {
    /// Most recently created first
    #[default]
    Newest,
    /// Cheapest first
    PriceAsc,
    /// Most expensive first
    PriceDesc,
    /// Highest rated first
    RatingDesc,
    /// Most reviewed first
    Popularity,
    /// Deepest discount first
    DiscountDesc,
}

/// Immutable, fully-normalized filter state for one search request
///
/// Built once per request via [`SearchCriteriaBuilder`], then consumed by
/// the query translation and service layers. `category_ids` starts out
/// unresolved (`None` unless the raw category id was unusable); the
/// service expands it to the category subtree before executing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchCriteria {
    /// Case-insensitive keyword matched against name, brand and tags
    pub keyword: Option<String>,
    /// Inclusive lower price bound in minor units
    pub price_min: Option<i64>,
    /// Inclusive upper price bound in minor units
    pub price_max: Option<i64>,
    /// Accepted brands, empty = unconstrained
    pub brands: Vec<String>,
    /// Minimum rating, clamped to [0, 5]
    pub min_rating: Option<f64>,
    /// Minimum discount percentage in (0, 100]; 0 means unconstrained
    pub min_discount: Option<i64>,
    /// Only products with stock_quantity > 0
    pub in_stock_only: bool,
    /// Only featured products
    pub featured_only: bool,
    /// Requested tags, OR semantics, empty = unconstrained
    pub tags: Vec<String>,
    /// Requested category id, if it parsed
    pub category_id: Option<Uuid>,
    /// Resolved category subtree. None = unconstrained, Some(empty) =
    /// matches nothing (unknown or unparseable category).
    pub category_ids: Option<Vec<Uuid>>,
    /// Sort order
    pub sort: SortKey,
    /// 1-based page number
    pub page: u32,
    /// Page size, capped at [`MAX_PAGE_SIZE`]
    pub page_size: u32,
}

impl SearchCriteria {
    /// Criteria with no filters: first default-sorted page of all
    /// active products.
    pub fn unconstrained() -> Self {
        SearchCriteriaBuilder::new().build()
    }

    /// Number of documents to skip for the requested page
    pub fn skip(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    /// Whether the category filter still needs subtree resolution
    pub fn needs_category_resolution(&self) -> bool {
        self.category_id.is_some() && self.category_ids.is_none()
    }
}

/// Builder that normalizes raw query-string input into [`SearchCriteria`]
///
/// All setters are synchronous and pure; category subtree expansion is
/// deferred to the service so criteria construction never does I/O.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteriaBuilder {
    criteria: SearchCriteria,
}

impl SearchCriteriaBuilder {
    pub fn new() -> Self {
        Self {
            criteria: SearchCriteria {
                page: 1,
                page_size: DEFAULT_PAGE_SIZE,
                ..Default::default()
            },
        }
    }

    /// Free-text keyword. Blank input is a no-op.
    pub fn keyword(mut self, raw: Option<&str>) -> Self {
        if let Some(raw) = raw {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                self.criteria.keyword = Some(trimmed.to_string());
            }
        }
        self
    }

    /// Price bounds in minor units. A bound that fails to parse or is
    /// negative is ignored; a reversed range is swapped rather than
    /// rejected.
    pub fn price_range(mut self, min_raw: Option<&str>, max_raw: Option<&str>) -> Self {
        let mut min = parse_non_negative(min_raw);
        let mut max = parse_non_negative(max_raw);

        if let (Some(lo), Some(hi)) = (min, max)
            && lo > hi
        {
            min = Some(hi);
            max = Some(lo);
        }

        self.criteria.price_min = min;
        self.criteria.price_max = max;
        self
    }

    /// Comma-separated brand list, deduplicated. Empty = unconstrained.
    pub fn brands(mut self, raw: Option<&str>) -> Self {
        self.criteria.brands = parse_list(raw);
        self
    }

    /// Minimum rating, clamped to [0, 5]. Invalid = unconstrained.
    pub fn min_rating(mut self, raw: Option<&str>) -> Self {
        self.criteria.min_rating = raw
            .and_then(|r| r.trim().parse::<f64>().ok())
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(0.0, 5.0));
        self
    }

    /// Minimum discount percentage, clamped to [0, 100]. Zero or invalid
    /// input means unconstrained, not "discount >= 0".
    pub fn min_discount(mut self, raw: Option<&str>) -> Self {
        self.criteria.min_discount = raw
            .and_then(|r| r.trim().parse::<i64>().ok())
            .map(|d| d.clamp(0, 100))
            .filter(|d| *d > 0);
        self
    }

    /// In-stock flag with truthy coercion ("true"/"1")
    pub fn in_stock_only(mut self, raw: Option<&str>) -> Self {
        self.criteria.in_stock_only = parse_truthy(raw);
        self
    }

    /// Featured flag with truthy coercion ("true"/"1")
    pub fn featured_only(mut self, raw: Option<&str>) -> Self {
        self.criteria.featured_only = parse_truthy(raw);
        self
    }

    /// Comma-separated tag list, deduplicated, OR semantics
    pub fn tags(mut self, raw: Option<&str>) -> Self {
        self.criteria.tags = parse_list(raw);
        self
    }

    /// Category filter by id. An unparseable id behaves like an unknown
    /// category: the filter matches nothing instead of failing.
    pub fn category(mut self, raw: Option<&str>) -> Self {
        if let Some(raw) = raw {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                match Uuid::parse_str(trimmed) {
                    Ok(id) => self.criteria.category_id = Some(id),
                    Err(_) => self.criteria.category_ids = Some(Vec::new()),
                }
            }
        }
        self
    }

    /// Sort key; unrecognized input falls back to newest
    pub fn sort(mut self, raw: Option<&str>) -> Self {
        self.criteria.sort = raw
            .and_then(|r| SortKey::from_str(r.trim()).ok())
            .unwrap_or_default();
        self
    }

    /// Pagination. Page floors at 1; page size defaults to
    /// [`DEFAULT_PAGE_SIZE`] and is capped at [`MAX_PAGE_SIZE`].
    pub fn paginate(mut self, page_raw: Option<&str>, limit_raw: Option<&str>) -> Self {
        self.criteria.page = page_raw
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        self.criteria.page_size = limit_raw
            .and_then(|l| l.trim().parse::<u32>().ok())
            .filter(|l| *l >= 1)
            .map(|l| l.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        self
    }

    /// Finish building and return the immutable criteria
    pub fn build(self) -> SearchCriteria {
        self.criteria
    }
}

fn parse_non_negative(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|r| r.trim().parse::<i64>().ok())
        .filter(|v| *v >= 0)
}

fn parse_truthy(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|r| r.trim().to_ascii_lowercase()).as_deref(),
        Some("true") | Some("1")
    )
}

/// Split a delimited list, trim entries, drop blanks, dedup preserving
/// first-seen order
fn parse_list(raw: Option<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if let Some(raw) = raw {
        for entry in raw.split(',') {
            let trimmed = entry.trim();
            if !trimmed.is_empty() && !out.iter().any(|e| e == trimmed) {
                out.push(trimmed.to_string());
            }
        }
    }
    out
}
