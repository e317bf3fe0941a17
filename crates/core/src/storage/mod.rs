mod error;
mod error_type;
mod memory;
mod traits;

pub use error::{Result, StoreError};
pub use error_type::store_error_type;
pub use memory::InMemoryItemStore;
pub use traits::ItemStore;
