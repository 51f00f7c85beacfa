//! Backends
//!
//! Implementations of the catalog, order and payment collaborators.

pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::InMemoryBackend;
