//! Townboard application library.
//!
//! Headless client core for a hosted-backend business directory. The three
//! consumed services (auth, data, storage) live behind reqwest clients in
//! [`backend`]; everything stateful this crate owns sits on top of them:
//!
//! - [`auth`] - session store fed by an ordered auth-event inbox
//! - [`entitlement`] - premium flag cache with a stale-response guard
//! - [`gateway`] - listing reads (cached) and the in-memory ads board
//! - [`submissions`] - business-listing and job-application flows
//! - [`device`] - seams for the black-box device services (asset bytes,
//!   geolocation)
//!
//! No inbound network surface is owned here; the CLI drives this library.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod backend;
pub mod config;
pub mod device;
pub mod entitlement;
pub mod error;
pub mod gateway;
pub mod state;
pub mod submissions;

pub use error::{AppError, Result};
pub use state::AppState;
