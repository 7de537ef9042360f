//! Townboard Core - Shared types library.
//!
//! This crate provides common types used across all Townboard components:
//! - `directory` - Application library (session, entitlements, submissions)
//! - `cli` - Command-line driver
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async
//! code. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, coordinates,
//!   and the listing category table

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
