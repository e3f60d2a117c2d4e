pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::EstimateConfig;

pub use adapters::{
    catalog::{catalog_source_for, CsvFileCatalog, HttpCatalog},
    storage::LocalStorage,
};
pub use core::{
    browser::{BrowserAction, BrowserSettings, BrowserView, CatalogBrowser},
    draft::Draft,
    engine::EstimateEngine,
    filter::{category_options, filter_items, CategoryLevel, FilterState, SearchMode},
    paginator::{Page, PageAction, PageState},
    pipeline::EstimatePipeline,
};
pub use domain::model::{CatalogItem, Estimate, LineItem, Markups, Totals};
pub use utils::error::{EstimateError, Result};
