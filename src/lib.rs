//! Filtering, aggregation and derived metrics for the fantasy-football
//! player dashboard.

pub mod analysis;
pub mod config;
pub mod data;
pub mod store;
