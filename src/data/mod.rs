//! Catalog data: groups, fetching, caching, TLE parsing and search

pub mod catalog;
pub mod fetch_worker;
mod search;
pub mod source;
mod tle_parser;

pub use catalog::{
    default_groups, load_groups, CachedCatalog, CatalogCacheManager, Group, GroupSource,
};
pub use fetch_worker::{FetchResponse, FetchWorker};
pub use search::*;
pub use source::{CatalogSource, HttpCatalogSource};
pub use tle_parser::*;
