// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod sales_api_client;
