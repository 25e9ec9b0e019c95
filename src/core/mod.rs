//! Core module - workspace, configuration, storage and bulk operations

pub mod config;
pub mod generator;
pub mod import;
pub mod store;
pub mod telemetry;
pub mod workspace;

pub use config::Config;
pub use generator::generate_placeholders;
pub use import::{Dataset, ImportError, ImportMode, ImportOptions, ImportStats};
pub use store::{SearchField, StoreError, VehicleStore};
pub use workspace::{Workspace, WorkspaceError};
