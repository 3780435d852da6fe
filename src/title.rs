//! Page title validation
//!
//! Titles double as filename stems, so the pattern is the only defense
//! against path traversal. It must be applied to every title derived from
//! user input before the title reaches the page store.

use regex::Regex;

/// Pattern a valid page title must match
pub const TITLE_PATTERN: &str = "^[A-Za-z0-9]+$";

/// Validates page titles against [`TITLE_PATTERN`]
///
/// The regex is compiled once; share the validator through application
/// state rather than rebuilding it per request.
#[derive(Debug, Clone)]
pub struct TitleValidator {
    pattern: Regex,
}

impl TitleValidator {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(TITLE_PATTERN).expect("valid title pattern"),
        }
    }

    /// True iff `title` is non-empty and all ASCII letters or digits
    pub fn is_valid(&self, title: &str) -> bool {
        self.pattern.is_match(title)
    }
}

impl Default for TitleValidator {
    fn default() -> Self {
        Self::new()
    }
}
