//! Core for the itemstack project.
//!
//! Everything here is a pure description of the items API stack (schema,
//! mapping templates, resources and their dependency graph) plus the pieces
//! the local emulator needs to execute those templates against a store.

pub mod execution;
pub mod resolver;
pub mod schema;
pub mod stack;
pub mod storage;
pub mod templates;

/// Name shared by the DynamoDB table and the GraphQL entity type.
pub const TABLE_NAME: &str = "items";
