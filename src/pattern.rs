//! Numeric URL pattern inference
//!
//! Given the first and last URL of an image sequence, e.g.
//! `https://cdn.example/book/page_0001.jpg` and `.../page_0120.jpg`, derive a
//! template plus the inclusive index range so every URL in between can be
//! generated.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Width of the zero-padded placeholder substituted into the template
pub const PLACEHOLDER_WIDTH: usize = 4;

/// Digit run directly before the final extension of the last path segment
static NUMBER_BEFORE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(\d+)\.[^./]*$").unwrap()
});

/// A URL template with one numeric placeholder and the range it spans
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlPattern {
    prefix: String,
    suffix: String,
    /// First index (from the start URL)
    pub start: u32,
    /// Last index (from the end URL)
    pub end: u32,
}

/// Location of the matched digit run inside a URL
#[derive(Debug, PartialEq, Eq)]
struct NumberSpan {
    start: usize,
    end: usize,
    value: u32,
}

fn locate_number(url: &str) -> Result<NumberSpan> {
    // Query string and fragment never hold the sequence number
    let path_end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..path_end];

    let not_found = || Error::PatternNotFound {
        url: url.to_string(),
    };

    let digits = NUMBER_BEFORE_EXTENSION
        .captures(path)
        .and_then(|caps| caps.get(1))
        .ok_or_else(not_found)?;
    let value = digits.as_str().parse::<u32>().map_err(|_| not_found())?;

    Ok(NumberSpan {
        start: digits.start(),
        end: digits.end(),
        value,
    })
}

impl UrlPattern {
    /// Infer the template and range from the first and last URL of a sequence
    ///
    /// The template keeps the start URL verbatim except for the matched digit
    /// span, so digits repeated elsewhere in the URL are left alone.
    ///
    /// The range order is not checked here; see [`UrlPattern::ensure_ascending`].
    pub fn extract(start_url: &str, end_url: &str) -> Result<Self> {
        let first = locate_number(start_url)?;
        let last = locate_number(end_url)?;

        Ok(Self {
            prefix: start_url[..first.start].to_string(),
            suffix: start_url[first.end..].to_string(),
            start: first.value,
            end: last.value,
        })
    }

    /// Fail with [`Error::RangeOrder`] when start > end
    pub fn ensure_ascending(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::RangeOrder {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Number of URLs in the inclusive range (0 if reversed)
    pub fn len(&self) -> u32 {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start).saturating_add(1)
        }
    }

    /// Whether the range is reversed and therefore empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the URL for one index
    pub fn url_for(&self, index: u32) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            index,
            self.suffix,
            width = PLACEHOLDER_WIDTH
        )
    }

    /// Template with `{}` marking the placeholder, for display and logging
    pub fn template(&self) -> String {
        format!("{}{{:0{}}}{}", self.prefix, PLACEHOLDER_WIDTH, self.suffix)
    }

    /// All `(index, url)` pairs in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (u32, String)> + '_ {
        (self.start..=self.end).map(move |index| (index, self.url_for(index)))
    }
}
