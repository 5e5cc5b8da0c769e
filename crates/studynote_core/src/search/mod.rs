//! Note list filtering.

pub mod filter;
