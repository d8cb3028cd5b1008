//! Configuration module
//!
//! Engine limits are plain serde structs so embedders can load them from
//! whatever JSON source they already have.

mod engine;

pub use engine::*;
