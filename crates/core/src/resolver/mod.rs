mod engine;
mod error;

pub use engine::ResolverEngine;
pub use error::{ResolveError, Result};
