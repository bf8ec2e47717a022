//! Utility modules shared by the loaders
//!
//! - LazyFrame helpers: typed materialization with column validation

pub mod lazy_helpers;

pub use lazy_helpers::{materialize_with_columns, require_columns};
