//! fieldkit server: schema registry, URL filter translation, GraphQL item
//! backend and the HTTP API exposing them.

pub mod backend;
pub mod config;
pub mod error;
pub mod filters;
pub mod network;
pub mod schema;
pub mod traits;

pub use backend::GraphqlBackend;
pub use config::{LogFormat, ServerConfig};
pub use error::{ApiError, SchemaError};
pub use filters::{build_list_query, build_where_clause, transform_filter, ListQuery};
pub use network::NetworkModule;
pub use schema::SchemaRegistry;
pub use traits::SchemaProvider;
