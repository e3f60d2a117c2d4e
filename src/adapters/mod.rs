// Adapters layer: concrete implementations for external systems (catalog sources, storage).

pub mod catalog;
pub mod storage;
