// Infrastructure layer - External dependencies and adapters
pub mod chart_image;
pub mod config;
pub mod http_repository;
pub mod pdf_writer;
pub mod query_cache;
pub mod retry;
