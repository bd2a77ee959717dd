//! Offset pagination types.
//!
//! A [`PageRequest`] describes which slice of a result set to return and how
//! to order it. Backends answer with a [`Page`] carrying the slice plus the
//! total number of matching elements.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of elements per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Sort direction for a single property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Parses `asc`/`desc` case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    /// Returns the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Ordering on one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    /// Property name (`id` or an attribute name).
    pub property: String,
    /// Sort direction.
    pub direction: SortDirection,
}

impl SortOrder {
    /// Ascending order on a property.
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending order on a property.
    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parses a `sort` request parameter value.
    ///
    /// The format is `prop[,prop...][,asc|desc]`: the trailing direction, if
    /// present, applies to every listed property. Blank segments are ignored.
    ///
    /// ```
    /// use ayoos_persistence::types::{SortDirection, SortOrder};
    ///
    /// let orders = SortOrder::parse_param("name,createdDate,desc");
    /// assert_eq!(orders.len(), 2);
    /// assert!(orders.iter().all(|o| o.direction == SortDirection::Desc));
    /// ```
    pub fn parse_param(value: &str) -> Vec<SortOrder> {
        let mut segments: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let direction = match segments.last().and_then(|s| SortDirection::parse(s)) {
            Some(direction) => {
                segments.pop();
                direction
            }
            None => SortDirection::Asc,
        };

        segments
            .into_iter()
            .map(|property| SortOrder {
                property: property.to_string(),
                direction,
            })
            .collect()
    }
}

/// A request for one page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: usize,
    /// Maximum number of elements on the page (at least 1).
    pub size: usize,
    /// Sort orders, applied in sequence.
    pub sort: Vec<SortOrder>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
        }
    }
}

impl PageRequest {
    /// Creates an unsorted page request. A size of zero is raised to one.
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size: size.max(1),
            sort: Vec::new(),
        }
    }

    /// Appends a sort order.
    pub fn with_sort(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    /// Returns the number of elements to skip.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }

    /// Returns the offset as a SQL integer, saturating at `i64::MAX`.
    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.offset()).unwrap_or(i64::MAX)
    }

    /// Returns the page size as a SQL integer, saturating at `i64::MAX`.
    pub fn sql_limit(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }

    /// Returns true if no sort order was requested.
    pub fn is_unsorted(&self) -> bool {
        self.sort.is_empty()
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The elements on this page, in result order.
    pub content: Vec<T>,
    /// Zero-based page index.
    pub number: usize,
    /// Requested page size.
    pub size: usize,
    /// Total number of elements across all pages.
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Creates a page for the given request.
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            number: request.page,
            size: request.size,
            total_elements,
        }
    }

    /// Creates an empty page for the given request.
    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Total number of pages; zero when there are no elements.
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 1;
        }
        self.total_elements.div_ceil(self.size as u64)
    }

    /// Returns true if a later page exists.
    pub fn has_next(&self) -> bool {
        (self.number as u64).saturating_add(1) < self.total_pages()
    }

    /// Returns true if this is not the first page.
    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    /// Returns true if this page has no elements.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns the number of elements on this page.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Maps the elements to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}
