pub mod cache;
pub mod catalog;
pub mod http;
