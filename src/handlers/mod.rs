//! HTTP handlers for entity create/read/list and schema bootstrap.

pub mod bootstrap;
pub mod entity;
pub use bootstrap::*;
pub use entity::*;
