//! HTTP handlers for derived resource CRUD.

pub mod entity;
pub use entity::*;
