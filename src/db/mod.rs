//! Database module: pool management and SQL repositories.
//!
//! This module is split into two submodules:
//! - `model`: query-input shapes and row-mapping helpers.
//! - `repo`: SQL-only functions that map rows into domain entities.
//!
//! External modules should import from `outreach_crm::db` — we re-export the
//! repository API and the query shapes for convenience.

pub mod model;
pub mod repo;

pub use model::ListFilters;
pub use repo::*;
