//! HTTP transport for the mock CRUD surface
//!
//! Maps the `/mock/api/mock` paths onto entity reads, saves and deletes.

pub mod handlers;
