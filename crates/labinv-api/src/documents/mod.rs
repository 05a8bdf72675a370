// Document store: collections of JSON documents addressed by id.

pub mod client;
pub mod types;
pub mod value;

pub use client::{DEFAULT_DOCUMENTS_URL, DocumentClient};
pub use types::Document;
