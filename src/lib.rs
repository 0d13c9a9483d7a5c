pub mod api;
pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod model;
pub mod poll;
pub mod referee;
pub mod stats;
