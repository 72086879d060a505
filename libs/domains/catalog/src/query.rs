//! Translation of [`SearchCriteria`] into MongoDB filter and sort
//! documents.
//!
//! Every filter document carries `is_active: true`; inactive products
//! are invisible to search regardless of requested filters. Facet
//! queries reuse the same translation with one dimension excluded so a
//! selected facet value never zeroes out its own counts.

use crate::criteria::{SearchCriteria, SortKey};
use mongodb::bson::{self, Bson, Document, doc};

/// Fixed price bucket boundaries in minor currency units. Each entry is
/// (inclusive lower bound, exclusive upper bound); `None` marks the
/// open-ended top bucket.
pub const PRICE_BUCKETS: [(i64, Option<i64>); 5] = [
    (0, Some(2_500)),
    (2_500, Some(10_000)),
    (10_000, Some(50_000)),
    (50_000, Some(100_000)),
    (100_000, None),
];

/// Rating thresholds for the "N stars & up" facet, highest first
pub const RATING_THRESHOLDS: [i64; 4] = [4, 3, 2, 1];

/// Maximum number of tags returned by the tag facet
pub const TAG_FACET_LIMIT: i64 = 10;

/// Maximum number of typeahead suggestions per request
pub const SUGGESTION_LIMIT: i64 = 10;

/// Minimum query length before suggestions run
pub const MIN_SUGGESTION_CHARS: usize = 2;

/// A facet dimension that can be excluded from a filter document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetDimension {
    Brand,
    Price,
    Rating,
    Discount,
    Stock,
    Tag,
}

/// Build the full filter document for the given criteria
pub fn filter_document(criteria: &SearchCriteria) -> Document {
    build_filter(criteria, None)
}

/// Build the filter document with one facet dimension's own clause
/// omitted
pub fn filter_document_excluding(criteria: &SearchCriteria, dimension: FacetDimension) -> Document {
    build_filter(criteria, Some(dimension))
}

fn build_filter(criteria: &SearchCriteria, exclude: Option<FacetDimension>) -> Document {
    let mut filter = doc! { "is_active": true };

    if let Some(keyword) = &criteria.keyword {
        let pattern = regex::escape(keyword);
        filter.insert(
            "$or",
            vec![
                doc! { "name": { "$regex": &pattern, "$options": "i" } },
                doc! { "brand": { "$regex": &pattern, "$options": "i" } },
                doc! { "tags": { "$regex": &pattern, "$options": "i" } },
            ],
        );
    }

    if let Some(ids) = &criteria.category_ids {
        let ids: Vec<Bson> = ids
            .iter()
            .map(|id| bson::to_bson(id).unwrap_or(Bson::Null))
            .collect();
        filter.insert("category_id", doc! { "$in": ids });
    }

    if exclude != Some(FacetDimension::Price) {
        let mut price = Document::new();
        if let Some(min) = criteria.price_min {
            price.insert("$gte", min);
        }
        if let Some(max) = criteria.price_max {
            price.insert("$lte", max);
        }
        if !price.is_empty() {
            filter.insert("price", price);
        }
    }

    if exclude != Some(FacetDimension::Brand) && !criteria.brands.is_empty() {
        filter.insert("brand", doc! { "$in": criteria.brands.clone() });
    }

    if exclude != Some(FacetDimension::Rating)
        && let Some(min_rating) = criteria.min_rating
    {
        filter.insert("rating", doc! { "$gte": min_rating });
    }

    if exclude != Some(FacetDimension::Discount)
        && let Some(min_discount) = criteria.min_discount
    {
        filter.insert("discount_percentage", doc! { "$gte": min_discount });
    }

    if exclude != Some(FacetDimension::Stock) && criteria.in_stock_only {
        filter.insert("stock_quantity", doc! { "$gt": 0 });
    }

    if criteria.featured_only {
        filter.insert("is_featured", true);
    }

    if exclude != Some(FacetDimension::Tag) && !criteria.tags.is_empty() {
        filter.insert("tags", doc! { "$in": criteria.tags.clone() });
    }

    filter
}

/// Sort document for the given key. Every order carries an `_id`
/// tiebreak so pagination is deterministic when the primary key ties.
pub fn sort_document(sort: SortKey) -> Document {
    match sort {
        SortKey::Newest => doc! { "created_at": -1, "_id": 1 },
        SortKey::PriceAsc => doc! { "price": 1, "_id": 1 },
        SortKey::PriceDesc => doc! { "price": -1, "_id": 1 },
        SortKey::RatingDesc => doc! { "rating": -1, "_id": 1 },
        SortKey::Popularity => doc! { "num_reviews": -1, "_id": 1 },
        SortKey::DiscountDesc => doc! { "discount_percentage": -1, "_id": 1 },
    }
}

/// Filter for one price bucket, layered on top of an existing filter
pub fn price_bucket_filter(mut base: Document, min: i64, max: Option<i64>) -> Document {
    let mut range = doc! { "$gte": min };
    if let Some(max) = max {
        range.insert("$lt", max);
    }
    base.insert("price", range);
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::SearchCriteriaBuilder;
    use uuid::Uuid;

    #[test]
    fn test_empty_criteria_still_requires_active() {
        let criteria = SearchCriteriaBuilder::new().build();
        let filter = filter_document(&criteria);
        assert_eq!(filter, doc! { "is_active": true });
    }

    #[test]
    fn test_keyword_produces_case_insensitive_or_clause() {
        let criteria = SearchCriteriaBuilder::new().keyword(Some("shoe")).build();
        let filter = filter_document(&criteria);

        let branches = filter.get_array("$or").unwrap();
        assert_eq!(branches.len(), 3);

        let name_clause = branches[0].as_document().unwrap();
        let regex = name_clause.get_document("name").unwrap();
        assert_eq!(regex.get_str("$regex").unwrap(), "shoe");
        assert_eq!(regex.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_keyword_regex_metacharacters_are_escaped() {
        let criteria = SearchCriteriaBuilder::new()
            .keyword(Some("2.0 (pro)"))
            .build();
        let filter = filter_document(&criteria);

        let branches = filter.get_array("$or").unwrap();
        let name_clause = branches[0].as_document().unwrap();
        let pattern = name_clause
            .get_document("name")
            .unwrap()
            .get_str("$regex")
            .unwrap();
        assert_eq!(pattern, regex::escape("2.0 (pro)"));
    }

    #[test]
    fn test_price_bounds_translate_to_range() {
        let criteria = SearchCriteriaBuilder::new()
            .price_range(Some("100"), Some("5000"))
            .build();
        let filter = filter_document(&criteria);

        let price = filter.get_document("price").unwrap();
        assert_eq!(price.get_i64("$gte").unwrap(), 100);
        assert_eq!(price.get_i64("$lte").unwrap(), 5000);
    }

    #[test]
    fn test_empty_category_set_matches_nothing() {
        let criteria = SearchCriteriaBuilder::new()
            .category(Some("not-a-uuid"))
            .build();
        let filter = filter_document(&criteria);

        let cat = filter.get_document("category_id").unwrap();
        assert!(cat.get_array("$in").unwrap().is_empty());
    }

    #[test]
    fn test_resolved_categories_use_in_clause() {
        let id = Uuid::new_v4();
        let mut criteria = SearchCriteriaBuilder::new().build();
        criteria.category_ids = Some(vec![id]);
        let filter = filter_document(&criteria);

        let cat = filter.get_document("category_id").unwrap();
        assert_eq!(cat.get_array("$in").unwrap().len(), 1);
    }

    #[test]
    fn test_exclusion_drops_only_its_own_dimension() {
        let criteria = SearchCriteriaBuilder::new()
            .brands(Some("Nike,Adidas"))
            .min_rating(Some("4"))
            .in_stock_only(Some("true"))
            .build();

        let without_brand = filter_document_excluding(&criteria, FacetDimension::Brand);
        assert!(!without_brand.contains_key("brand"));
        assert!(without_brand.contains_key("rating"));
        assert!(without_brand.contains_key("stock_quantity"));
        assert_eq!(without_brand.get_bool("is_active").unwrap(), true);

        let without_rating = filter_document_excluding(&criteria, FacetDimension::Rating);
        assert!(without_rating.contains_key("brand"));
        assert!(!without_rating.contains_key("rating"));
    }

    #[test]
    fn test_exclusion_of_unset_dimension_matches_full_filter() {
        let criteria = SearchCriteriaBuilder::new()
            .brands(Some("Nike"))
            .build();
        let full = filter_document(&criteria);
        let without_price = filter_document_excluding(&criteria, FacetDimension::Price);
        assert_eq!(full, without_price);
    }

    #[test]
    fn test_every_sort_has_id_tiebreak() {
        for sort in [
            SortKey::Newest,
            SortKey::PriceAsc,
            SortKey::PriceDesc,
            SortKey::RatingDesc,
            SortKey::Popularity,
            SortKey::DiscountDesc,
        ] {
            let doc = sort_document(sort);
            assert_eq!(doc.get_i32("_id").unwrap(), 1, "sort {:?}", sort);
        }
    }

    #[test]
    fn test_price_bucket_filter_open_ended_top() {
        let base = doc! { "is_active": true };
        let bucket = price_bucket_filter(base, 100_000, None);
        let price = bucket.get_document("price").unwrap();
        assert_eq!(price.get_i64("$gte").unwrap(), 100_000);
        assert!(!price.contains_key("$lt"));
    }

    #[test]
    fn test_price_buckets_are_contiguous() {
        for window in PRICE_BUCKETS.windows(2) {
            assert_eq!(window[0].1, Some(window[1].0));
        }
        assert_eq!(PRICE_BUCKETS.last().unwrap().1, None);
    }
}
