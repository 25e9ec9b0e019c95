//! CLI command implementations

pub mod completions;
pub mod generate;
pub mod import;
pub mod init;
pub mod report;
pub mod reset;
pub mod status;
pub mod vehicle;
