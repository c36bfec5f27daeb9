pub mod chart;
pub mod client;

pub use chart::extract_chart;
pub use client::{AdkClient, AdkError};
