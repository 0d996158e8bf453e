//! Pagination for list endpoints.
//!
//! List endpoints accept either `limit`/`offset` or `limit`/`page` as query
//! parameters. When `page` is present it wins over `offset`.
//!
//! ```ignore
//! use hallpass_core::pagination::{PaginationMeta, PaginationParams};
//!
//! async fn list_leaves(
//!     Query(params): Query<PaginationParams>,
//! ) -> Result<Json<PaginatedLeaves>, AppError> {
//!     let (rows, total) = store.list_leaves(&query, params.limit(), params.offset()).await?;
//!     Ok(Json(PaginatedLeaves {
//!         data: rows,
//!         meta: PaginationMeta::from_params(&params, total),
//!     }))
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Query strings carry numbers as text; an empty value means "not supplied".
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Position of a returned page within the full result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of matching items
    pub total: i64,
    /// Page size that was applied
    pub limit: i64,
    /// Items skipped before this page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Page number, when page-based pagination was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Whether more items follow this page
    pub has_more: bool,
}

impl PaginationMeta {
    /// Builds the metadata for a page fetched with `params` out of `total` rows.
    #[must_use]
    pub fn from_params(params: &PaginationParams, total: i64) -> Self {
        let limit = params.limit();
        let offset = params.offset();
        Self {
            total,
            limit,
            offset: Some(offset),
            page: params.page(),
            has_more: offset + limit < total,
        }
    }
}

/// `limit` is clamped to [1, 100] (default 10), `offset` to >= 0, `page` to >= 1.
#[derive(Debug, Clone, Default, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (ignored if `page` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// Page number, 1-indexed
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        match self.page {
            Some(page) => (page.max(1) - 1) * self.limit(),
            None => self.offset.unwrap_or(0).max(0),
        }
    }

    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(limit: Option<i64>, offset: Option<i64>, page: Option<i64>) -> PaginationParams {
        PaginationParams {
            limit,
            offset,
            page,
        }
    }

    #[test]
    fn test_defaults_when_nothing_supplied() {
        let p = PaginationParams::default();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.page(), None);
    }

    #[test]
    fn test_limit_is_clamped() {
        let cases = [
            (Some(0), 1),
            (Some(-3), 1),
            (Some(1), 1),
            (Some(50), 50),
            (Some(100), 100),
            (Some(250), 100),
        ];
        for (input, expected) in cases {
            assert_eq!(params(input, None, None).limit(), expected);
        }
    }

    #[test]
    fn test_negative_offset_is_zero() {
        assert_eq!(params(Some(10), Some(-5), None).offset(), 0);
    }

    #[test]
    fn test_page_takes_precedence_over_offset() {
        let p = params(Some(20), Some(7), Some(3));
        assert_eq!(p.offset(), 40);
        assert_eq!(p.page(), Some(3));
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let p = params(Some(10), None, Some(0));
        assert_eq!(p.offset(), 0);
        assert_eq!(p.page(), Some(1));
    }

    #[test]
    fn test_deserialize_from_query_strings() {
        let p: PaginationParams = serde_json::from_str(r#"{"limit":"25","offset":"50"}"#).unwrap();
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn test_deserialize_empty_strings_as_missing() {
        let p: PaginationParams = serde_json::from_str(r#"{"limit":"","page":" "}"#).unwrap();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.page(), None);
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        let result: Result<PaginationParams, _> = serde_json::from_str(r#"{"limit":"ten"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_meta_from_params_has_more() {
        let meta = PaginationMeta::from_params(&params(Some(10), Some(0), None), 25);
        assert_eq!(meta.total, 25);
        assert_eq!(meta.offset, Some(0));
        assert!(meta.has_more);

        let last = PaginationMeta::from_params(&params(Some(10), None, Some(3)), 25);
        assert_eq!(last.offset, Some(20));
        assert!(!last.has_more);
    }

    #[test]
    fn test_meta_serialization_skips_missing_page() {
        let meta = PaginationMeta::from_params(&PaginationParams::default(), 0);
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["total"], 0);
        assert_eq!(json["has_more"], false);
        assert!(json.get("page").is_none());
    }
}
