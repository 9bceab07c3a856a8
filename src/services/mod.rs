// Service exports
pub mod auth;
pub mod cache;
pub mod memory;
pub mod openai;
pub mod postgres;
pub mod sample_catalog;
pub mod store;

pub use auth::{AuthError, Claims, JwtVerifier};
pub use cache::CatalogCache;
pub use memory::InMemoryStore;
pub use openai::OpenAiClient;
pub use postgres::PostgresStore;
pub use sample_catalog::sample_providers;
pub use store::{RecordStore, StoreError};
