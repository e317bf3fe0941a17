mod executor;
mod types;

pub use executor::execute;
pub use types::{GraphQlError, GraphQlRequest, GraphQlResponse};
