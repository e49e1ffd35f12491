//
//  gitlab-client
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination Types for GitLab API Responses
//!
//! GitLab offers two pagination schemes for list endpoints:
//!
//! - **Offset** pagination: `page` / `per_page` query parameters, with the
//!   position reported back through `X-Total`, `X-Total-Pages`, `X-Page`,
//!   `X-Per-Page`, `X-Next-Page` and `X-Prev-Page` headers.
//! - **Keyset** pagination: `pagination=keyset` plus opaque cursor
//!   parameters. The next page is announced through an RFC 5988 `Link`
//!   header whose `rel="next"` URL carries the cursor.
//!
//! # Iterating Pages
//!
//! ```rust,no_run
//! use gitlab_client::{GitlabClient, ListOptions};
//! use gitlab_client::api::resources::ListProjectsOptions;
//!
//! async fn all_projects(client: &GitlabClient) -> gitlab_client::Result<usize> {
//!     let mut options = Some(ListOptions::offset(1, 50));
//!     let mut count = 0;
//!     while let Some(opts) = options {
//!         let filters = ListProjectsOptions { list: opts, ..Default::default() };
//!         let page = client.projects().list(&filters).await?;
//!         count += page.items.len();
//!         options = page.next_options();
//!     }
//!     Ok(count)
//! }
//! ```
//!
//! # Notes
//!
//! - Header values that fail to parse are reported as `0`
//! - Only the parameter names in [`CURSOR_KEYS`] are lifted from a keyset
//!   `next` link; everything else in that URL is ignored

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use reqwest::header::{HeaderMap, LINK};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Query, RequestOptions};

/// Items per page when the caller does not choose a size.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest page size GitLab honours.
pub const MAX_PER_PAGE: u32 = 100;

/// Query parameters that make up a keyset cursor.
pub const CURSOR_KEYS: &[&str] = &["id_after", "cursor"];

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Asc,
    Desc,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("invalid sort direction '{other}', expected asc or desc")),
        }
    }
}

/// Pagination scheme requested for a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Pagination {
    /// Page-number pagination.
    #[default]
    Offset,
    /// Cursor pagination. An empty cursor requests the first page.
    Keyset { cursor: BTreeMap<String, String> },
}

/// Options shared by every list endpoint.
///
/// `page` and `per_page` use `0` for "unset": nothing is sent and the
/// server default applies. Keyset requests never send `page`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// 1-based page number (offset pagination only).
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Field to order by, e.g. `id` or `star_count`.
    pub order_by: Option<String>,
    /// Sort direction.
    pub sort: Option<Sort>,
    /// Pagination scheme.
    pub pagination: Pagination,
}

impl ListOptions {
    /// Offset options. A page below 1 becomes 1, a zero page size becomes
    /// [`DEFAULT_PER_PAGE`] and sizes above [`MAX_PER_PAGE`] are clamped.
    pub fn offset(page: i64, per_page: u32) -> Self {
        let page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
        Self {
            page,
            per_page: normalise_per_page(per_page),
            ..Self::default()
        }
    }

    /// Keyset options for the first page, ordered by `order_by`.
    pub fn keyset(order_by: impl Into<String>, sort: Sort, per_page: u32) -> Self {
        Self {
            per_page: normalise_per_page(per_page),
            order_by: Some(order_by.into()),
            sort: Some(sort),
            pagination: Pagination::Keyset {
                cursor: BTreeMap::new(),
            },
            ..Self::default()
        }
    }

    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// `true` for keyset pagination.
    pub fn is_keyset(&self) -> bool {
        matches!(self.pagination, Pagination::Keyset { .. })
    }

    /// The keyset cursor, if any.
    pub fn cursor(&self) -> Option<&BTreeMap<String, String>> {
        match &self.pagination {
            Pagination::Keyset { cursor } => Some(cursor),
            Pagination::Offset => None,
        }
    }
}

fn normalise_per_page(per_page: u32) -> u32 {
    match per_page {
        0 => DEFAULT_PER_PAGE,
        n => n.min(MAX_PER_PAGE),
    }
}

impl RequestOptions for ListOptions {
    fn append_query(&self, query: &mut Query) {
        match &self.pagination {
            Pagination::Offset => {
                if self.page > 0 {
                    query.push("page", self.page);
                }
            }
            Pagination::Keyset { cursor } => {
                query.push("pagination", "keyset");
                for (key, value) in cursor {
                    query.push(key, value);
                }
            }
        }
        if self.per_page > 0 {
            query.push("per_page", self.per_page);
        }
        query.push_opt("order_by", self.order_by.as_deref());
        query.push_opt("sort", self.sort);
    }
}

/// Pagination metadata decoded from the response headers of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// The options that produced this page.
    pub options: ListOptions,
    /// `X-Total`
    pub total: u64,
    /// `X-Total-Pages`
    pub total_pages: u64,
    /// `X-Page`
    pub page: u32,
    /// `X-Per-Page`
    pub per_page: u32,
    /// `X-Next-Page`, `0` on the last page.
    pub next_page: u32,
    /// `X-Prev-Page`, `0` on the first page.
    pub prev_page: u32,
    /// `Link` rel="first" (keyset only).
    pub first_link: Option<String>,
    /// `Link` rel="prev" (keyset only).
    pub prev_link: Option<String>,
    /// `Link` rel="next" (keyset only).
    pub next_link: Option<String>,
    /// `Link` rel="last" (keyset only).
    pub last_link: Option<String>,
}

impl PageInfo {
    /// Reads pagination headers for a response produced by `options`.
    pub fn from_headers(options: &ListOptions, headers: &HeaderMap) -> Self {
        let mut info = Self {
            options: options.clone(),
            total: header_number(headers, "x-total"),
            total_pages: header_number(headers, "x-total-pages"),
            page: header_number(headers, "x-page"),
            per_page: header_number(headers, "x-per-page"),
            next_page: header_number(headers, "x-next-page"),
            prev_page: header_number(headers, "x-prev-page"),
            ..Self::default()
        };

        if options.is_keyset() {
            for value in headers.get_all(LINK) {
                let Ok(value) = value.to_str() else {
                    continue;
                };
                for (rel, url) in parse_link_header(value) {
                    match rel.as_str() {
                        "first" => info.first_link = Some(url),
                        "prev" => info.prev_link = Some(url),
                        "next" => info.next_link = Some(url),
                        "last" => info.last_link = Some(url),
                        _ => {}
                    }
                }
            }
        }

        info
    }

    /// `true` when another page follows this one.
    pub fn has_next(&self) -> bool {
        self.next().is_some()
    }

    /// Options for the following page, or `None` on the last page.
    pub fn next(&self) -> Option<ListOptions> {
        match &self.options.pagination {
            Pagination::Offset => self.offset_options(self.next_page),
            Pagination::Keyset { .. } => self.keyset_options(self.next_link.as_deref()?),
        }
    }

    /// Options for the preceding page, or `None` on the first page.
    pub fn prev(&self) -> Option<ListOptions> {
        match &self.options.pagination {
            Pagination::Offset => self.offset_options(self.prev_page),
            Pagination::Keyset { .. } => self.keyset_options(self.prev_link.as_deref()?),
        }
    }

    fn offset_options(&self, page: u32) -> Option<ListOptions> {
        if page == 0 {
            return None;
        }
        Some(ListOptions {
            page,
            pagination: Pagination::Offset,
            ..self.options.clone()
        })
    }

    fn keyset_options(&self, link: &str) -> Option<ListOptions> {
        let cursor = cursor_from_link(link)?;
        Some(ListOptions {
            page: 0,
            pagination: Pagination::Keyset { cursor },
            ..self.options.clone()
        })
    }
}

fn header_number<T: FromStr + Default>(headers: &HeaderMap, name: &str) -> T {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_default()
}

/// Extracts the cursor parameters from a pagination link URL.
fn cursor_from_link(link: &str) -> Option<BTreeMap<String, String>> {
    let url = Url::parse(link).ok()?;
    let cursor: BTreeMap<String, String> = url
        .query_pairs()
        .filter(|(key, _)| CURSOR_KEYS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    (!cursor.is_empty()).then_some(cursor)
}

/// Parses an RFC 5988 `Link` header into `(rel, url)` pairs.
///
/// Malformed entries are skipped.
pub fn parse_link_header(value: &str) -> Vec<(String, String)> {
    let mut links = Vec::new();
    for entry in value.split(',') {
        let mut parts = entry.split(';');
        let Some(target) = parts.next() else {
            continue;
        };
        let target = target.trim();
        let Some(url) = target.strip_prefix('<').and_then(|t| t.strip_suffix('>')) else {
            continue;
        };
        for param in parts {
            let Some((name, rel)) = param.split_once('=') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case("rel") {
                let rel = rel.trim().trim_matches('"');
                for rel in rel.split_whitespace() {
                    links.push((rel.to_string(), url.to_string()));
                }
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn query_of(options: &ListOptions) -> Query {
        let mut query = Query::new();
        options.append_query(&mut query);
        query
    }

    #[test]
    fn test_offset_normalisation() {
        let options = ListOptions::offset(0, 0);
        assert_eq!(options.page, 1);
        assert_eq!(options.per_page, DEFAULT_PER_PAGE);

        let options = ListOptions::offset(-3, 500);
        assert_eq!(options.page, 1);
        assert_eq!(options.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_offset_query() {
        let options = ListOptions::offset(3, 10)
            .with_order_by("star_count")
            .with_sort(Sort::Desc);
        let query = query_of(&options);
        assert_eq!(query.get("page"), Some("3"));
        assert_eq!(query.get("per_page"), Some("10"));
        assert_eq!(query.get("order_by"), Some("star_count"));
        assert_eq!(query.get("sort"), Some("desc"));
        assert_eq!(query.get("pagination"), None);
    }

    #[test]
    fn test_keyset_query_never_sends_page() {
        let mut options = ListOptions::keyset("id", Sort::Asc, 50);
        options.page = 7;
        let query = query_of(&options);
        assert_eq!(query.get("pagination"), Some("keyset"));
        assert_eq!(query.get("page"), None);
        assert_eq!(query.get("order_by"), Some("id"));
    }

    #[test]
    fn test_offset_next_page() {
        let options = ListOptions::offset(4, 20).with_order_by("name");
        let info = PageInfo::from_headers(
            &options,
            &headers(&[
                ("x-next-page", "5"),
                ("x-prev-page", "3"),
                ("x-page", "4"),
                ("x-per-page", "20"),
                ("x-total", "200"),
                ("x-total-pages", "10"),
            ]),
        );

        assert_eq!(info.total, 200);
        assert_eq!(info.total_pages, 10);
        assert_eq!(info.page, 4);

        let next = info.next().unwrap();
        assert_eq!(next.page, 5);
        assert_eq!(next.per_page, 20);
        assert_eq!(next.order_by.as_deref(), Some("name"));

        assert_eq!(info.prev().unwrap().page, 3);
    }

    #[test]
    fn test_offset_last_page() {
        let options = ListOptions::offset(1, 20);
        let empty = PageInfo::from_headers(&options, &headers(&[("x-next-page", "")]));
        assert!(empty.next().is_none());

        let absent = PageInfo::from_headers(&options, &HeaderMap::new());
        assert!(absent.next().is_none());
        assert!(!absent.has_next());
    }

    #[test]
    fn test_unparseable_headers_read_as_zero() {
        let info = PageInfo::from_headers(
            &ListOptions::default(),
            &headers(&[("x-total", "lots"), ("x-page", "-1")]),
        );
        assert_eq!(info.total, 0);
        assert_eq!(info.page, 0);
    }

    #[test]
    fn test_keyset_next_from_link() {
        let options = ListOptions::keyset("id", Sort::Asc, 20);
        let info = PageInfo::from_headers(
            &options,
            &headers(&[(
                "link",
                r#"<https://x/api/v4/projects?id_after=42&cursor=abc&per_page=20>; rel="next""#,
            )]),
        );

        let next = info.next().unwrap();
        let expected: BTreeMap<String, String> = [
            ("cursor".to_string(), "abc".to_string()),
            ("id_after".to_string(), "42".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(next.cursor(), Some(&expected));
        assert_eq!(next.order_by.as_deref(), Some("id"));
        assert_eq!(next.sort, Some(Sort::Asc));
        assert_eq!(next.per_page, 20);

        let query = query_of(&next);
        assert_eq!(query.get("id_after"), Some("42"));
        assert_eq!(query.get("per_page"), Some("20"));
    }

    #[test]
    fn test_keyset_without_next_link_ends() {
        let options = ListOptions::keyset("id", Sort::Asc, 20);
        let info = PageInfo::from_headers(
            &options,
            &headers(&[("link", r#"<https://x/api/v4/projects?id_after=1>; rel="first""#)]),
        );
        assert!(info.next().is_none());
        assert!(info.first_link.is_some());
    }

    #[test]
    fn test_same_headers_parse_identically() {
        let offset = ListOptions::offset(2, 20);
        let offset_headers = headers(&[
            ("x-total", "95"),
            ("x-total-pages", "5"),
            ("x-page", "2"),
            ("x-per-page", "20"),
            ("x-next-page", "3"),
            ("x-prev-page", "1"),
        ]);
        let first = PageInfo::from_headers(&offset, &offset_headers);
        assert_eq!(first, PageInfo::from_headers(&offset, &offset_headers));
        assert_eq!(first.next(), PageInfo::from_headers(&offset, &offset_headers).next());

        let keyset = ListOptions::keyset("id", Sort::Desc, 50);
        let keyset_headers = headers(&[(
            "link",
            r#"<https://x/api/v4/projects?id_after=7>; rel="next", <https://x/api/v4/projects>; rel="first""#,
        )]);
        let first = PageInfo::from_headers(&keyset, &keyset_headers);
        assert_eq!(first, PageInfo::from_headers(&keyset, &keyset_headers));
        assert_eq!(first.next(), PageInfo::from_headers(&keyset, &keyset_headers).next());
    }

    #[test]
    fn test_links_ignored_for_offset_pagination() {
        let info = PageInfo::from_headers(
            &ListOptions::offset(1, 20),
            &headers(&[("link", r#"<https://x/api/v4/projects?page=2>; rel="next""#)]),
        );
        assert!(info.next_link.is_none());
        assert!(info.next().is_none());
    }

    #[test]
    fn test_parse_link_header_multiple_entries() {
        let value = r#"<https://x/p?page=1>; rel="first", <https://x/p?page=3>; rel="next", <https://x/p?page=9>; rel="last""#;
        let links = parse_link_header(value);
        assert_eq!(
            links,
            vec![
                ("first".to_string(), "https://x/p?page=1".to_string()),
                ("next".to_string(), "https://x/p?page=3".to_string()),
                ("last".to_string(), "https://x/p?page=9".to_string()),
            ]
        );
        assert_eq!(parse_link_header(value), links);
    }

    #[test]
    fn test_parse_link_header_skips_malformed() {
        assert!(parse_link_header("not a link").is_empty());
        assert!(parse_link_header("").is_empty());
        assert_eq!(parse_link_header("<https://x/p>; rel=next").len(), 1);
    }

    #[test]
    fn test_sort_from_str() {
        assert_eq!("ASC".parse::<Sort>().unwrap(), Sort::Asc);
        assert!("sideways".parse::<Sort>().is_err());
    }
}
