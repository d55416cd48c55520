//! `pricematch`: cross-catalog product matching and price comparison.
//!
//! Pure engine crate: receives already-scraped catalogs, returns matched
//! product pairs and a paired t-test summary. No scraping, file IO or
//! plotting.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod reconcile;
pub mod similarity;
pub mod stats;
pub mod unit_price;

pub use catalog::Catalog;
pub use config::CompareConfig;
pub use engine::run;
pub use error::{CompareError, Incomparable, ParseFailure};
pub use matcher::{match_catalogs, MatchOptions};
pub use model::{
    CatalogEntry, ComparisonReport, MatchedProduct, PriceField, Product, Store, Summary, Unit, UnitPrice,
};
pub use reconcile::reconcile;
pub use stats::compare;
pub use unit_price::parse_unit_price;
