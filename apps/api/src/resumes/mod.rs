//! Resume aggregate: the root every section and item hangs off.

pub mod handlers;
pub mod service;

pub use service::ResumeService;
