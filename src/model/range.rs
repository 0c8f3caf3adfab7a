//! Page range expressions such as `"1-3,5,8-9"`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest page index accepted in a range expression.
pub const MAX_PAGE_INDEX: u32 = 100_000;

/// An ordered selection of distinct 1-based page indices.
///
/// Order follows the expression, not page number: `"5,1-2"` selects
/// pages 5, 1 and 2 in that order. Repeated pages keep their first position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PageRange {
    pages: Vec<u32>,
}

impl PageRange {
    /// Parse a range expression.
    ///
    /// Tokens are separated by commas; each token is a page number `N` or an
    /// inclusive span `A-B` with `A <= B`. Whitespace around tokens and around
    /// `-` is ignored. Blank input yields an empty range.
    ///
    /// Any malformed token fails the whole parse: non-numeric text, empty
    /// tokens (`"1,,2"`, a trailing comma), page `0` and reversed spans
    /// (`"3-1"`) are all rejected with [`Error::InvalidPageRange`].
    ///
    /// # Example
    /// ```
    /// use repdf::PageRange;
    ///
    /// let range = PageRange::parse("1-3, 5, 2").unwrap();
    /// assert_eq!(range.as_slice(), &[1, 2, 3, 5]);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }

        let mut range = Self::default();
        let mut seen = HashSet::new();

        for token in s.split(',') {
            let token = token.trim();
            if token.is_empty() {
                return Err(Error::InvalidPageRange(format!("empty entry in \"{}\"", s)));
            }

            let (start, end) = match token.split_once('-') {
                Some((start, end)) => (parse_index(start, token)?, parse_index(end, token)?),
                None => {
                    let page = parse_index(token, token)?;
                    (page, page)
                }
            };

            if start > end {
                return Err(Error::InvalidPageRange(format!(
                    "\"{}\" is reversed (use {}-{})",
                    token, end, start
                )));
            }

            for page in start..=end {
                if seen.insert(page) {
                    range.pages.push(page);
                }
            }
        }

        Ok(range)
    }

    /// Build a range from explicit page numbers, keeping first occurrences.
    pub fn from_pages(pages: impl IntoIterator<Item = u32>) -> Result<Self> {
        let mut range = Self::default();
        let mut seen = HashSet::new();
        for page in pages {
            if page == 0 || page > MAX_PAGE_INDEX {
                return Err(Error::InvalidPageRange(format!("page {} is not valid", page)));
            }
            if seen.insert(page) {
                range.pages.push(page);
            }
        }
        Ok(range)
    }

    /// Number of selected pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Selected pages in order.
    pub fn as_slice(&self) -> &[u32] {
        &self.pages
    }

    /// Iterate over selected pages in order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.iter().copied()
    }

    /// Check if a page is selected.
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    /// Highest selected page, if any.
    pub fn max_page(&self) -> Option<u32> {
        self.pages.iter().copied().max()
    }
}

fn parse_index(s: &str, token: &str) -> Result<u32> {
    let page: u32 = s
        .trim()
        .parse()
        .map_err(|_| Error::InvalidPageRange(format!("\"{}\" is not a page number or span", token)))?;

    if page == 0 {
        return Err(Error::InvalidPageRange(format!(
            "\"{}\": pages are numbered from 1",
            token
        )));
    }
    if page > MAX_PAGE_INDEX {
        return Err(Error::InvalidPageRange(format!(
            "\"{}\": page numbers above {} are not supported",
            token, MAX_PAGE_INDEX
        )));
    }
    Ok(page)
}

impl FromStr for PageRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PageRange {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<PageRange> for String {
    fn from(range: PageRange) -> Self {
        range.to_string()
    }
}

/// Compact form: consecutive ascending runs are written as spans.
impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut i = 0;
        while i < self.pages.len() {
            let start = self.pages[i];
            let mut end = start;
            while i + 1 < self.pages.len() && self.pages[i + 1] == end + 1 {
                end += 1;
                i += 1;
            }

            if !first {
                f.write_str(",")?;
            }
            first = false;

            if start == end {
                write!(f, "{}", start)?;
            } else {
                write!(f, "{}-{}", start, end)?;
            }
            i += 1;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a PageRange {
    type Item = &'a u32;
    type IntoIter = std::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}
