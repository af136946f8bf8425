pub mod client;

pub use client::{HttpIndexClient, IndexError, SearchHit, SearchIndex};
