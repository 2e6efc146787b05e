pub mod api_path;
mod client;

pub use client::{ScannerApi, ScannerClient};
