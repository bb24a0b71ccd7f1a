//! Catalog maintenance workflows

pub mod refresh;

pub use refresh::{AppOutcome, RefreshOptions, RefreshReport, Refresher};
