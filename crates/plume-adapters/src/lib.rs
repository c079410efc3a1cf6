//! Runtime adapters for Plume (config, model cache, persistence).

pub mod config;
pub mod model_cache;
pub mod store;
