pub mod alpha_vantage;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod feed;
pub mod types;
