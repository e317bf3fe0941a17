//! Shared application state.

use std::sync::Arc;

use itemstack_core::resolver::ResolverEngine;

/// Cloned for each request handler.
#[derive(Clone)]
pub struct AppState {
    /// Resolvers of the assembled stack, bound to the active item store.
    pub engine: Arc<ResolverEngine>,
}

impl AppState {
    pub fn new(engine: ResolverEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
