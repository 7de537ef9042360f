//! Business listing categories.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The category table offered by the submission form.
///
/// The backend stores categories as plain text; this list is the menu the
/// client presents, not a constraint the data service enforces.
pub const BUSINESS_CATEGORIES: &[&str] = &[
    "Restaurants & Cafes",
    "Grocery & Provisions",
    "Clothing & Fashion",
    "Electronics & Mobiles",
    "Health & Pharmacy",
    "Beauty & Salon",
    "Home Services",
    "Education & Coaching",
    "Automotive",
    "Real Estate",
    "Travel & Transport",
    "Other",
];

/// Errors that can occur when parsing a [`Category`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CategoryError {
    /// The input string is empty.
    #[error("category cannot be empty")]
    Empty,
}

/// A business category label.
///
/// Carries any non-empty label; [`Category::is_listed`] tells callers
/// whether it comes from the standard menu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Parse a category, rejecting empty labels.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError::Empty`] if the trimmed input is empty.
    pub fn parse(s: &str) -> Result<Self, CategoryError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CategoryError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the category label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this label appears in [`BUSINESS_CATEGORIES`].
    #[must_use]
    pub fn is_listed(&self) -> bool {
        BUSINESS_CATEGORIES.contains(&self.0.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
