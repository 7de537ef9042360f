//! Core types for Townboard.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod coords;
pub mod email;
pub mod id;

pub use category::{BUSINESS_CATEGORIES, Category, CategoryError};
pub use coords::{Coordinates, CoordinatesError};
pub use email::{Email, EmailError};
pub use id::*;
