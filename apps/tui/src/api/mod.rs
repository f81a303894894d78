pub mod client;
pub mod models;

pub use client::OutletApi;
pub use models::{ChatQuery, ChatResponse};
