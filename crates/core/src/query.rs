//! List query state and its URL query-string representation.
//!
//! `page`, `pageSize` and `search` round-trip through the query string so a
//! list view can be bookmarked and restored. Sorting is view-local and never
//! leaves the client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::constants::FIRST_PAGE;
use crate::error::CoreError;

pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "pageSize";
pub const SEARCH_PARAM: &str = "search";

/// Number of rows per page; restricted to the sizes offered by the pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Thirty,
    Forty,
    Fifty,
}

impl PageSize {
    pub const ALL: [Self; 5] = [Self::Ten, Self::Twenty, Self::Thirty, Self::Forty, Self::Fifty];

    #[must_use]
    pub const fn get(self) -> u32 {
        match self {
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Thirty => 30,
            Self::Forty => 40,
            Self::Fifty => 50,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = CoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL.into_iter().find(|s| s.get() == value).ok_or(CoreError::InvalidPageSize(value))
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

impl FromStr for PageSize {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u32 = s.trim().parse().map_err(|_| CoreError::InvalidInput(format!("page size {s}")))?;
        Self::try_from(n)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(CoreError::InvalidSortDirection(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

/// What page of which subset of a collection is displayed, and in what order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQueryState {
    /// 1-based page number.
    pub page: u32,
    pub page_size: PageSize,
    pub search: String,
    /// Ordered sort keys; the first key has the highest priority.
    pub sort: Vec<SortKey>,
}

impl Default for ListQueryState {
    fn default() -> Self {
        Self { page: FIRST_PAGE, page_size: PageSize::default(), search: String::new(), sort: Vec::new() }
    }
}

impl ListQueryState {
    /// Restores state from a URL query string, falling back to defaults for
    /// missing or invalid parameters. A leading `?` is ignored.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut state = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                PAGE_PARAM => match value.trim().parse::<u32>() {
                    Ok(n) if n >= FIRST_PAGE => state.page = n,
                    _ => tracing::debug!(value = %value, "ignoring invalid page parameter"),
                },
                PAGE_SIZE_PARAM => match value.parse::<PageSize>() {
                    Ok(size) => state.page_size = size,
                    Err(e) => tracing::debug!(error = %e, "ignoring invalid pageSize parameter"),
                },
                SEARCH_PARAM => state.search = value.into_owned(),
                _ => {},
            }
        }
        state
    }

    /// Serializes `page`, `pageSize` and, when non-empty, `search`.
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair(PAGE_PARAM, &self.page.to_string());
        serializer.append_pair(PAGE_SIZE_PARAM, &self.page_size.to_string());
        if !self.search.is_empty() {
            serializer.append_pair(SEARCH_PARAM, &self.search);
        }
        serializer.finish()
    }

    /// Query parameters sent to the API for this state.
    #[must_use]
    pub fn request_params(&self) -> [(&'static str, String); 3] {
        [
            (PAGE_PARAM, self.page.to_string()),
            (PAGE_SIZE_PARAM, self.page_size.to_string()),
            (SEARCH_PARAM, self.search.clone()),
        ]
    }

    /// Zero-based index of the first row on the current page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size.get())
    }

    /// Cycles the sort on `column`: unsorted → ascending → descending → unsorted.
    ///
    /// Without `multi`, any other sort keys are dropped first.
    pub fn toggle_sort(&mut self, column: &str, multi: bool) {
        if !multi {
            self.sort.retain(|k| k.column == column);
        }
        let Some(idx) = self.sort.iter().position(|k| k.column == column) else {
            self.sort.push(SortKey { column: column.to_owned(), direction: SortDirection::Asc });
            return;
        };
        if self.sort[idx].direction == SortDirection::Asc {
            self.sort[idx].direction = SortDirection::Desc;
        } else {
            self.sort.remove(idx);
        }
    }
}
