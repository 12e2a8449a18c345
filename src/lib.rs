pub mod api;
pub mod backend;
pub mod codec;
pub mod config;
pub mod datastore;
pub mod observability;
pub mod partition;
