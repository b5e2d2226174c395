use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Job, JobStatus, QueryError};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Columns the crawl service accepts for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    CreatedAt,
    Url,
    Status,
    PageTitle,
    StartedAt,
    CompletedAt,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::CreatedAt,
        SortField::Url,
        SortField::Status,
        SortField::PageTitle,
        SortField::StartedAt,
        SortField::CompletedAt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Url => "url",
            SortField::Status => "status",
            SortField::PageTitle => "page_title",
            SortField::StartedAt => "started_at",
            SortField::CompletedAt => "completed_at",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| QueryError::UnknownSortField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(QueryError::UnknownSortOrder(other.to_string())),
        }
    }
}

/// View parameters for one page of the job list.
///
/// Rebuilt on every view change; the last successfully applied query is what
/// background polling re-issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub page: u32,
    pub limit: u32,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub search: Option<String>,
    pub status: Option<JobStatus>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            sort_by: Some(SortField::CreatedAt),
            sort_order: Some(SortOrder::Desc),
            search: None,
            status: None,
        }
    }
}

impl Query {
    /// A bare page request with no sort, search or filter.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            sort_by: None,
            sort_order: None,
            search: None,
            status: None,
        }
    }

    pub fn with_sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = Some(field);
        self.sort_order = Some(order);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_status(mut self, status: Option<JobStatus>) -> Self {
        self.status = status;
        self
    }

    /// Same view parameters on another page.
    pub fn on_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Clamps paging into the server's accepted range and drops blank search text.
    pub fn normalized(&self) -> Self {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned);
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            search,
            status: self.status,
        }
    }

    /// Canonical key/value form. Absent optionals are omitted, never sent empty.
    pub fn encode(&self) -> Vec<(&'static str, String)> {
        let query = self.normalized();
        let mut pairs = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(field) = query.sort_by {
            pairs.push(("sort_by", field.as_str().to_string()));
        }
        if let Some(order) = query.sort_order {
            pairs.push(("sort_order", order.as_str().to_string()));
        }
        if let Some(search) = query.search {
            pairs.push(("search", search));
        }
        if let Some(status) = query.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs
    }

    /// Rebuilds a query from key/value pairs in any order.
    ///
    /// Unknown keys and empty values are ignored; missing paging falls back to
    /// page 1 with the default page size.
    pub fn decode<I, K, V>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Query::new(1, DEFAULT_PAGE_SIZE);
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            if value.is_empty() {
                continue;
            }
            match key {
                "page" => query.page = parse_positive(key, value)?,
                "limit" => query.limit = parse_positive(key, value)?,
                "sort_by" => query.sort_by = Some(value.parse()?),
                "sort_order" => query.sort_order = Some(value.parse()?),
                "search" => query.search = Some(value.to_string()),
                "status" => query.status = Some(value.parse()?),
                _ => {}
            }
        }
        Ok(query.normalized())
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u32, QueryError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|number| *number > 0)
        .ok_or_else(|| QueryError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Body of `GET /urls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default, deserialize_with = "crate::job::null_as_empty")]
    pub jobs: Vec<Job>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl ListResponse {
    /// Splits the body into the job collection and the pagination derived from it.
    pub fn into_parts(self) -> (Vec<Job>, PaginationInfo) {
        let pagination = PaginationInfo::new(self.page, self.limit, self.total);
        (self.jobs, pagination)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationInfo {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encode_omits_absent_and_blank_fields() {
        let query = Query::new(2, 25).with_search("   ");
        assert_eq!(
            query.encode(),
            vec![("page", "2".to_string()), ("limit", "25".to_string())]
        );
    }

    #[test]
    fn encode_clamps_paging_into_server_range() {
        let pairs = Query::new(0, 500).encode();
        assert_eq!(pairs[0], ("page", "1".to_string()));
        assert_eq!(pairs[1], ("limit", MAX_PAGE_SIZE.to_string()));
    }

    #[test]
    fn decode_is_order_independent_and_round_trips() {
        let query = Query::new(3, 20)
            .with_sort(SortField::PageTitle, SortOrder::Asc)
            .with_search("example")
            .with_status(Some(JobStatus::Running));

        let mut pairs = query.encode();
        pairs.reverse();
        assert_eq!(Query::decode(pairs).unwrap(), query);
    }

    #[test]
    fn decode_round_trips_every_status_and_sort_field() {
        for status in JobStatus::ALL {
            for field in SortField::ALL {
                let query = Query::new(1, 10)
                    .with_sort(field, SortOrder::Desc)
                    .with_status(Some(status));
                assert_eq!(Query::decode(query.encode()).unwrap(), query);
            }
        }
    }

    #[test]
    fn decode_ignores_unknown_keys_and_empty_values() {
        let query = Query::decode([("page", "4"), ("search", ""), ("color", "blue")]).unwrap();
        assert_eq!(query, Query::new(4, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn decode_rejects_malformed_values() {
        assert_eq!(
            Query::decode([("limit", "ten")]),
            Err(QueryError::InvalidNumber {
                key: "limit".to_string(),
                value: "ten".to_string()
            })
        );
        assert_eq!(
            Query::decode([("sort_by", "createdAt")]),
            Err(QueryError::UnknownSortField("createdAt".to_string()))
        );
        assert_eq!(
            Query::decode([("status", "paused")]),
            Err(QueryError::UnknownStatus("paused".to_string()))
        );
    }

    #[test]
    fn pagination_rounds_total_pages_up() {
        let info = PaginationInfo::new(1, 10, 35);
        assert_eq!(info.total_pages, 4);
        assert!(info.has_next());
        assert!(!info.has_previous());
        assert_eq!(PaginationInfo::new(1, 10, 0).total_pages, 0);
        assert_eq!(PaginationInfo::new(1, 0, 5).total_pages, 0);
    }

    #[test]
    fn list_response_treats_null_jobs_as_empty() {
        let body = r#"{"jobs":null,"total":0,"page":1,"limit":10}"#;
        let response: ListResponse = serde_json::from_str(body).unwrap();
        let (jobs, pagination) = response.into_parts();
        assert!(jobs.is_empty());
        assert_eq!(pagination, PaginationInfo::new(1, 10, 0));
    }
}
