//! # Lossdrill Testing
//!
//! Test support for data loss drills without a database server.
//!
//! ## Components
//!
//! - **InMemoryTableStore**: a [`TableStore`](lossdrill_core::TableStore)
//!   over in-memory tables, with injected failures and a call log
//! - **MemTable**: a table of text values with an optional key column
//! - **Fixtures**: a populated `customers` table and matching plans

pub mod fixtures;
pub mod in_memory;

pub use fixtures::{customers_plan, customers_plan_with_size, customers_store, customers_table};
pub use in_memory::{InMemoryTableStore, MemTable, Row, StoreCall};
