mod client;
mod error;
mod query;

pub use client::{download, Credentials, DEFAULT_BASE_URL};
pub use query::{query_url, QueryParameters};
