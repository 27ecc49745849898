//! Mock entities, their save payloads and validation
//!
//! Everything here is independent of the HTTP layer and the filesystem.

pub mod entity;
pub mod payload;
pub mod validation;
