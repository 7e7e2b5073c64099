//! Listing query construction: search/category filters, deterministic
//! ordering, and page clamping shared by the product and order listings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw listing input as it arrives from the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    #[serde(default)]
    pub categories: Vec<Uuid>,
}

/// Normalized product filter: a case-insensitive "contains" predicate over
/// title and description, and an optional category-membership restriction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub categories: Vec<Uuid>,
}

impl ProductFilter {
    pub fn from_params(params: &ListingParams) -> Self {
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        Self {
            search,
            categories: params.categories.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.categories.is_empty()
    }

    /// Render the filter as a parameterized SQL predicate over the product
    /// table aliased `p`. Positional parameters start at `next_param`
    /// ($1-based). An unrestricted filter yields an empty clause.
    pub fn to_sql(&self, mut next_param: usize) -> SqlResult {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(search) = &self.search {
            conditions.push(format!(
                "(p.title ILIKE ${n} OR p.description ILIKE ${n})",
                n = next_param
            ));
            params.push(SqlParam::Text(format!("%{}%", escape_like(search))));
            next_param += 1;
        }

        if !self.categories.is_empty() {
            conditions.push(format!("p.category_id = ANY(${}::uuid[])", next_param));
            params.push(SqlParam::TextArray(
                self.categories.iter().map(Uuid::to_string).collect(),
            ));
        }

        SqlResult {
            clause: conditions.join(" AND "),
            params,
        }
    }
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    TextArray(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub clause: String,
    pub params: Vec<SqlParam>,
}

/// Deterministic listing order: ascending price with title as tie-break,
/// so repeated pagination over an unchanged dataset is stable.
pub const PRODUCT_ORDER: &str = "p.price ASC, p.title ASC";

/// A resolved page: requested page and limit reconciled against the total
/// matching count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub current: i64,
    pub total_pages: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Resolve pagination input against the total matching count.
    ///
    /// Absent or non-positive page defaults to 1; absent or non-positive
    /// limit (including 0) takes `default_limit`. A page past the end is
    /// clamped down to the last page rather than erroring. A total of zero
    /// yields zero pages and page 0 with an empty result set.
    pub fn resolve(page: Option<i64>, limit: Option<i64>, default_limit: i64, total: i64) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l,
            _ => default_limit,
        };
        let requested = match page {
            Some(p) if p > 0 => p,
            _ => 1,
        };
        let total_pages = if total <= 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        let current = requested.min(total_pages);
        let offset = (current - 1).max(0) * limit;
        Page {
            current,
            total_pages,
            limit,
            offset,
        }
    }

    pub fn info(&self, total: i64) -> PageInfo {
        PageInfo {
            total,
            total_pages: self.total_pages,
            current_page: self.current,
        }
    }
}

/// Pagination summary returned alongside every listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_page_and_limit_absent() {
        let page = Page::resolve(None, None, 14, 20);
        assert_eq!(page.current, 1);
        assert_eq!(page.limit, 14);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn zero_and_negative_inputs_take_defaults() {
        let page = Page::resolve(Some(0), Some(0), 14, 20);
        assert_eq!(page.current, 1);
        assert_eq!(page.limit, 14);

        let page = Page::resolve(Some(-2), Some(-5), 3, 9);
        assert_eq!(page.current, 1);
        assert_eq!(page.limit, 3);
    }

    #[test]
    fn page_past_the_end_clamps_to_last_page() {
        // 20 records at 14 per page: page 5 clamps to page 2 with 6 records left.
        let page = Page::resolve(Some(5), Some(14), 14, 20);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current, 2);
        assert_eq!(page.offset, 14);
    }

    #[test]
    fn clamped_page_is_at_least_one_when_records_exist() {
        for requested in 1..10 {
            let page = Page::resolve(Some(requested), Some(4), 4, 1);
            assert_eq!(page.current, 1);
            assert_eq!(page.offset, 0);
        }
    }

    #[test]
    fn zero_total_yields_zero_pages_without_error() {
        let page = Page::resolve(Some(3), Some(14), 14, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current, 0);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn exact_multiple_has_no_partial_page() {
        let page = Page::resolve(Some(2), Some(10), 10, 20);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current, 2);
        assert_eq!(page.offset, 10);
    }

    #[test]
    fn empty_filter_renders_no_clause() {
        let sql = ProductFilter::default().to_sql(1);
        assert!(sql.clause.is_empty());
        assert!(sql.params.is_empty());
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let filter = ProductFilter {
            search: Some("shoe".to_string()),
            categories: vec![],
        };
        let sql = filter.to_sql(1);
        assert_eq!(sql.clause, "(p.title ILIKE $1 OR p.description ILIKE $1)");
        assert_eq!(sql.params, vec![SqlParam::Text("%shoe%".to_string())]);
    }

    #[test]
    fn search_escapes_like_wildcards() {
        let filter = ProductFilter {
            search: Some("100%_cotton".to_string()),
            categories: vec![],
        };
        let sql = filter.to_sql(1);
        assert_eq!(sql.params, vec![SqlParam::Text("%100\\%\\_cotton%".to_string())]);
    }

    #[test]
    fn category_filter_uses_membership_predicate() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let filter = ProductFilter {
            search: None,
            categories: vec![a, b],
        };
        let sql = filter.to_sql(1);
        assert_eq!(sql.clause, "p.category_id = ANY($1::uuid[])");
        assert_eq!(
            sql.params,
            vec![SqlParam::TextArray(vec![a.to_string(), b.to_string()])]
        );
    }

    #[test]
    fn combined_filter_numbers_params_in_order() {
        let c = Uuid::new_v4();
        let filter = ProductFilter {
            search: Some("mug".to_string()),
            categories: vec![c],
        };
        let sql = filter.to_sql(3);
        assert_eq!(
            sql.clause,
            "(p.title ILIKE $3 OR p.description ILIKE $3) AND p.category_id = ANY($4::uuid[])"
        );
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn blank_search_is_dropped_during_normalization() {
        let params = ListingParams {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(ProductFilter::from_params(&params).is_empty());
    }
}
