//! Infrastructure layer for Hearth.
//!
//! File-system backed services: configuration discovery and loading.

pub mod config_service;
pub mod paths;

pub use config_service::ConfigService;
pub use paths::HearthPaths;
