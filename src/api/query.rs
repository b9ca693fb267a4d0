use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Asc
    }
}

/// Parameters accepted by the paginated list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: SortDirection,
    /// Entity-specific filters, sent verbatim.
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 15,
            search: None,
            sort_by: None,
            sort_dir: SortDirection::Asc,
            filters: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    pub fn with_per_page(per_page: u32) -> Self {
        Self {
            per_page,
            ..Self::default()
        }
    }

    /// Query-string pairs. Blank search and filter values are left out and
    /// the sort direction is only sent alongside a sort column.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.max(1).to_string()),
            ("per_page".to_string(), self.per_page.max(1).to_string()),
        ];

        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search".into(), search.to_string()));
        }

        if let Some(sort_by) = self.sort_by.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("sort_by".into(), sort_by.to_string()));
            pairs.push(("sort_dir".into(), self.sort_dir.as_str().to_string()));
        }

        for (key, value) in &self.filters {
            if !value.trim().is_empty() {
                pairs.push((key.clone(), value.clone()));
            }
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn default_query_only_sends_paging() {
        assert_eq!(
            ListQuery::default().to_pairs(),
            vec![pair("page", "1"), pair("per_page", "15")]
        );
    }

    #[test]
    fn full_query_includes_sort_search_and_filters() {
        let mut query = ListQuery::with_per_page(50);
        query.page = 3;
        query.search = Some("  TW-07 ".into());
        query.sort_by = Some("created_at".into());
        query.sort_dir = SortDirection::Desc;
        query.filters.insert("machine_id".into(), "12".into());
        query.filters.insert("shift".into(), " ".into());

        assert_eq!(
            query.to_pairs(),
            vec![
                pair("page", "3"),
                pair("per_page", "50"),
                pair("search", "TW-07"),
                pair("sort_by", "created_at"),
                pair("sort_dir", "desc"),
                pair("machine_id", "12"),
            ]
        );
    }

    #[test]
    fn zero_page_is_clamped() {
        let query = ListQuery {
            page: 0,
            per_page: 0,
            ..ListQuery::default()
        };
        assert_eq!(query.to_pairs()[..2], [pair("page", "1"), pair("per_page", "1")]);
    }

    #[test]
    fn decodes_from_frontend_shape() {
        let query: ListQuery =
            serde_json::from_str(r#"{"page":2,"sortBy":"name","sortDir":"desc"}"#).unwrap();
        assert_eq!(query.page, 2);
        assert_eq!(query.per_page, 15);
        assert_eq!(query.sort_dir, SortDirection::Desc);
    }
}
