pub mod browser;
pub mod draft;
pub mod engine;
pub mod estimate;
pub mod filter;
pub mod paginator;
pub mod pdf;
pub mod pipeline;
pub mod sheet;

pub use crate::domain::model::{CatalogItem, Estimate, LineItem, RenderedEstimate};
pub use crate::domain::ports::{CatalogSource, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
